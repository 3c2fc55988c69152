//! Bulk application dispatch.
//!
//! For each target: validate the address, stage a per-company cover letter, compose subject
//! and body, then send (or just log, on a dry run). One target failing never stops the batch.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::company::company_from_email;
use crate::extraction::matcher::EmailMatcher;
use crate::extraction::models::EmailRecord;
use crate::llm_client::TextGenerator;
use crate::outreach::composer::{compose_email, generate_letter, letter_filename};
use crate::outreach::mailer::{DispatchError, LogMailer, Mailer, OutgoingEmail};
use crate::sources::document::text_to_docx;
use crate::sources::extract_document_text;

const DEFAULT_LETTER_EXT: &str = ".docx";
const GENERATED_LETTER_EXT: &str = ".docx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutreachTarget {
    pub email: String,
    /// May be empty when the domain is a freemail provider.
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub job_description: String,
}

/// One target per record, company inferred from the address.
pub fn targets_from(records: &[EmailRecord], job_description: &str) -> Vec<OutreachTarget> {
    records
        .iter()
        .map(|r| OutreachTarget {
            email: r.address.clone(),
            company: company_from_email(&r.address),
            job_description: job_description.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub dry_run: bool,
    /// Full `From` header value.
    pub sender: String,
    pub cv_path: Option<PathBuf>,
    pub letter_template: Option<PathBuf>,
    pub letters_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SendStatus {
    Sent,
    DryRun,
    Skipped(String),
    Failed(String),
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStatus::Sent => write!(f, "sent"),
            SendStatus::DryRun => write!(f, "dry_run"),
            SendStatus::Skipped(reason) => write!(f, "skipped: {reason}"),
            SendStatus::Failed(reason) => write!(f, "error: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendLogEntry {
    pub email: String,
    pub company: String,
    pub letter: Option<PathBuf>,
    pub status: SendStatus,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub sent: usize,
    pub dry_run: usize,
    pub skipped: usize,
    pub errors: usize,
    pub log: Vec<SendLogEntry>,
}

impl DispatchSummary {
    fn record(&mut self, target: &OutreachTarget, letter: Option<PathBuf>, status: SendStatus) {
        match &status {
            SendStatus::Sent => self.sent += 1,
            SendStatus::DryRun => self.dry_run += 1,
            SendStatus::Skipped(_) => self.skipped += 1,
            SendStatus::Failed(_) => self.errors += 1,
        }
        self.log.push(SendLogEntry {
            email: target.email.clone(),
            company: target.company.clone(),
            letter,
            status,
            at: Utc::now(),
        });
    }
}

/// Processes every target in order. `mailer` is only consulted for real sends; with no
/// transport, a real send is recorded as failed rather than sent.
pub async fn dispatch_all(
    targets: &[OutreachTarget],
    generator: Option<&dyn TextGenerator>,
    mailer: Option<&dyn Mailer>,
    matcher: &EmailMatcher,
    options: &DispatchOptions,
) -> DispatchSummary {
    let batch_id = Uuid::new_v4();
    info!(
        "Dispatch {batch_id}: {} targets (dry_run={})",
        targets.len(),
        options.dry_run
    );

    let mut summary = DispatchSummary::default();
    for target in targets {
        let email = target.email.trim();
        if !matcher.is_valid_address(email) {
            warn!("Dispatch {batch_id}: skipping invalid email: {email}");
            summary.record(target, None, SendStatus::Skipped("invalid email".to_string()));
            continue;
        }

        let letter = match stage_letter(options, target, generator).await {
            Ok(letter) => letter,
            Err(e) => {
                error!("Dispatch {batch_id}: letter for {email} failed: {e}");
                summary.record(target, None, SendStatus::Failed(e.to_string()));
                continue;
            }
        };

        let draft = match compose_email(generator, &target.job_description, &target.company).await
        {
            Ok(draft) => draft,
            Err(e) => {
                error!("Dispatch {batch_id}: composing for {email} failed: {e}");
                summary.record(target, letter, SendStatus::Failed(e.to_string()));
                continue;
            }
        };

        let attachments = existing_attachments([options.cv_path.as_deref(), letter.as_deref()]);
        let outgoing = OutgoingEmail {
            from: options.sender.clone(),
            to: email.to_string(),
            subject: draft.subject,
            body: draft.body,
            attachments,
        };

        let (result, delivered) = if options.dry_run {
            (LogMailer.send(&outgoing).await, SendStatus::DryRun)
        } else {
            let result = match mailer {
                Some(mailer) => mailer.send(&outgoing).await,
                None => Err(DispatchError::Transport(
                    "no mail transport configured".to_string(),
                )),
            };
            (result, SendStatus::Sent)
        };

        match result {
            Ok(()) => {
                info!("Dispatch {batch_id}: {delivered} -> {email}");
                summary.record(target, letter, delivered);
            }
            Err(e) => {
                error!("Dispatch {batch_id}: error sending to {email}: {e}");
                summary.record(target, letter, SendStatus::Failed(e.to_string()));
            }
        }
    }

    info!(
        "Dispatch {batch_id} done: sent={} dry_run={} skipped={} errors={}",
        summary.sent, summary.dry_run, summary.skipped, summary.errors
    );
    summary
}

/// Puts the letter for `target` in `letters_dir`.
///
/// With a generator and a job description the template is adapted by the model and saved
/// as `lettre_{company}.docx`. Otherwise the template is copied unchanged under the same
/// base name with its own extension.
async fn stage_letter(
    options: &DispatchOptions,
    target: &OutreachTarget,
    generator: Option<&dyn TextGenerator>,
) -> Result<Option<PathBuf>, DispatchError> {
    let Some(template) = options.letter_template.as_deref() else {
        return Ok(None);
    };

    if let Some(generator) = generator.filter(|_| !target.job_description.trim().is_empty()) {
        let template_text = read_template_text(template).await?;
        let letter =
            generate_letter(generator, &template_text, &target.job_description, "").await?;
        let path = save_letter(&options.letters_dir, &target.company, &letter).await?;
        return Ok(Some(path));
    }

    let ext = template
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| DEFAULT_LETTER_EXT.to_string());
    let destination = options.letters_dir.join(letter_filename(&target.company, &ext));

    tokio::fs::create_dir_all(&options.letters_dir).await?;
    tokio::fs::copy(template, &destination).await?;
    Ok(Some(destination))
}

/// Plain text of a letter template file (DOCX, text or any other readable document).
pub async fn read_template_text(path: &Path) -> Result<String, DispatchError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path.to_string_lossy();
    Ok(extract_document_text(&name, Bytes::from(bytes)).await?)
}

/// Writes `letter` as `letters_dir/lettre_{company}.docx` and returns the path.
pub async fn save_letter(
    letters_dir: &Path,
    company: &str,
    letter: &str,
) -> Result<PathBuf, DispatchError> {
    let path = letters_dir.join(letter_filename(company, GENERATED_LETTER_EXT));
    let bytes = text_to_docx(letter)?;
    tokio::fs::create_dir_all(letters_dir).await?;
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

fn existing_attachments<'a>(paths: impl IntoIterator<Item = Option<&'a Path>>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .flatten()
        .filter(|p| p.exists())
        .map(Path::to_path_buf)
        .collect()
}
