use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extraction::aggregate::dedupe_records;
use crate::extraction::models::EmailRecord;
use crate::export::send_log_to_csv_string;
use crate::outreach::composer::generate_letter;
use crate::outreach::dispatch::{
    dispatch_all, read_template_text, save_letter, targets_from, DispatchOptions,
    DispatchSummary, OutreachTarget,
};
use crate::outreach::mailer::from_header;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct TargetsRequest {
    pub records: Vec<EmailRecord>,
    #[serde(default)]
    pub job_description: String,
}

/// POST /api/v1/outreach/targets
pub async fn handle_targets(Json(req): Json<TargetsRequest>) -> Json<Vec<OutreachTarget>> {
    Json(targets_from(&req.records, &req.job_description))
}

#[derive(Deserialize)]
pub struct LetterRequest {
    pub job_description: String,
    /// Falls back to the configured template file when absent.
    pub template_text: Option<String>,
    #[serde(default)]
    pub extra_instructions: String,
    #[serde(default)]
    pub company: String,
}

#[derive(Serialize)]
pub struct LetterResponse {
    pub letter: String,
    pub filename: String,
    /// Where the `.docx` copy was written.
    pub path: PathBuf,
}

/// POST /api/v1/outreach/letter
pub async fn handle_letter(
    State(state): State<AppState>,
    Json(req): Json<LetterRequest>,
) -> Result<Json<LetterResponse>, AppError> {
    let generator = state
        .generator
        .as_deref()
        .ok_or_else(|| AppError::Unavailable("ANTHROPIC_API_KEY is not configured".to_string()))?;
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description is required".to_string()));
    }

    let template_text = match req.template_text.filter(|t| !t.trim().is_empty()) {
        Some(text) => text,
        None => configured_template_text(&state).await?,
    };

    let letter = generate_letter(
        generator,
        &template_text,
        &req.job_description,
        &req.extra_instructions,
    )
    .await?;

    let path = save_letter(&state.config.letters_dir, req.company.trim(), &letter)
        .await
        .map_err(|e| anyhow::anyhow!("saving letter: {e}"))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Letter saved to {}", path.display());
    Ok(Json(LetterResponse {
        letter,
        filename,
        path,
    }))
}

async fn configured_template_text(state: &AppState) -> Result<String, AppError> {
    let path = state.config.letter_template_path.as_ref().ok_or_else(|| {
        AppError::Validation(
            "template_text is required when LETTER_TEMPLATE_PATH is not set".to_string(),
        )
    })?;
    let text = read_template_text(path)
        .await
        .map_err(|e| anyhow::anyhow!("reading letter template {}: {e}", path.display()))?;
    Ok(text)
}

fn default_dry_run() -> bool {
    true
}

#[derive(Deserialize)]
pub struct SendRequest {
    pub records: Vec<EmailRecord>,
    #[serde(default)]
    pub job_description: String,
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct SendResponse {
    #[serde(flatten)]
    pub summary: DispatchSummary,
    /// Set when the send log CSV was written (real sends only).
    pub log_file: Option<PathBuf>,
}

/// POST /api/v1/outreach/send
pub async fn handle_send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, AppError> {
    if req.records.is_empty() {
        return Err(AppError::Validation("No emails to send".to_string()));
    }
    if !req.dry_run && state.mailer.is_none() {
        return Err(AppError::Unavailable(
            "No mail transport is configured; only dry runs are available".to_string(),
        ));
    }
    let sender = match state.config.from_address.as_deref() {
        Some(address) => from_header(&state.config.from_name, address),
        None if req.dry_run => state.config.from_name.clone(),
        None => {
            return Err(AppError::Validation(
                "FROM_ADDRESS must be configured to send".to_string(),
            ))
        }
    };

    let options = DispatchOptions {
        dry_run: req.dry_run,
        sender,
        cv_path: state.config.cv_path.clone(),
        letter_template: state.config.letter_template_path.clone(),
        letters_dir: state.config.letters_dir.clone(),
    };
    let targets = targets_from(&dedupe_records(req.records), &req.job_description);
    let summary = dispatch_all(
        &targets,
        state.generator.as_deref(),
        state.mailer.as_deref(),
        &state.matcher,
        &options,
    )
    .await;

    let log_file = if req.dry_run {
        None
    } else {
        let path = state.config.send_log_path.clone();
        let csv = send_log_to_csv_string(&summary.log)?;
        tokio::fs::write(&path, csv)
            .await
            .map_err(|e| anyhow::anyhow!("writing send log {}: {e}", path.display()))?;
        info!("Send log written to {}", path.display());
        Some(path)
    };
    Ok(Json(SendResponse { summary, log_file }))
}
