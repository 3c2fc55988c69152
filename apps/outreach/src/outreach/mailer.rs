//! Outgoing mail boundary.
//!
//! Dispatch only ever talks to a `Mailer`. The bundled `LogMailer` backs dry runs by
//! recording what would be sent. Real delivery needs a transport behind the same trait;
//! without one, only dry runs are accepted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::llm_client::LlmError;
use crate::sources::SourceError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Letter template unreadable: {0}")]
    Template(#[from] SourceError),

    #[error("Letter generation failed: {0}")]
    Letter(#[from] LlmError),

    #[error("Letter document could not be written: {0}")]
    Docx(#[from] zip::result::ZipError),
}

/// A fully composed message, attachments already resolved to existing files.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError>;
}

/// Logs every message instead of delivering it. Used for dry runs.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), DispatchError> {
        let attachments: Vec<String> = email
            .attachments
            .iter()
            .map(|p| format!("{} ({})", p.display(), attachment_content_type(p)))
            .collect();
        info!(
            "Mail -> From: {} | To: {} | Subject: {} | Attachments: {:?}",
            email.from, email.to, email.subject, attachments
        );
        Ok(())
    }
}

/// `Name <address>`, or the bare address when no display name is set.
pub fn from_header(name: &str, address: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        address.to_string()
    } else {
        format!("{name} <{address}>")
    }
}

/// MIME type used for an attachment, from its extension.
pub fn attachment_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        assert_eq!(from_header("Jane Doe", "jane@x.io"), "Jane Doe <jane@x.io>");
        assert_eq!(from_header("  ", "jane@x.io"), "jane@x.io");
    }

    #[test]
    fn test_attachment_content_type() {
        assert_eq!(attachment_content_type(Path::new("cv.PDF")), "application/pdf");
        assert!(attachment_content_type(Path::new("lettre.docx")).contains("wordprocessingml"));
        assert_eq!(
            attachment_content_type(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let email = OutgoingEmail {
            from: "Jane <jane@x.io>".to_string(),
            to: "hr@acme.io".to_string(),
            subject: "Candidature".to_string(),
            body: "Bonjour".to_string(),
            attachments: vec![PathBuf::from("cv.pdf")],
        };
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
