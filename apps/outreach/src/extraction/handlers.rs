use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export::records_to_csv_string;
use crate::extraction::aggregate::dedupe_records;
use crate::extraction::filter::{parse_keyword_list, CategoryTable};
use crate::extraction::models::{EmailRecord, SourceFailure};
use crate::extraction::pipeline::run_extraction;
use crate::sources::{parse_url_list, SourceInput};
use crate::state::AppState;

const PASTED_TEXT_SOURCE: &str = "pasted-text";
const EXPORT_FILENAME: &str = "emails.csv";

/// Fields of the `/extract` multipart form.
#[derive(Debug, Default)]
struct ExtractForm {
    documents: Vec<SourceInput>,
    urls: String,
    text: String,
    category: String,
    keywords: String,
}

impl ExtractForm {
    /// Documents in upload order, then URLs, then pasted text.
    fn into_sources(self) -> Vec<SourceInput> {
        let mut sources = self.documents;
        sources.extend(parse_url_list(&self.urls).into_iter().map(SourceInput::Url));
        if !self.text.trim().is_empty() {
            sources.push(SourceInput::Text {
                name: PASTED_TEXT_SOURCE.to_string(),
                text: self.text,
            });
        }
        sources
    }
}

async fn read_form(mut multipart: Multipart) -> Result<ExtractForm, AppError> {
    let mut form = ExtractForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "files" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            form.documents.push(SourceInput::Document {
                name: file_name,
                bytes,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        match name.as_str() {
            "urls" => form.urls = value,
            "text" => form.text = value,
            "category" => form.category = value,
            "keywords" => form.keywords = value,
            other => tracing::debug!("Ignoring unknown form field '{other}'"),
        }
    }
    Ok(form)
}

#[derive(Serialize)]
pub struct ExtractResponse {
    pub records: Vec<EmailRecord>,
    pub filtered: Vec<EmailRecord>,
    pub keywords: Vec<String>,
    pub processed_sources: usize,
    pub failures: Vec<SourceFailure>,
}

/// GET /api/v1/categories
pub async fn handle_categories(State(state): State<AppState>) -> Json<CategoryTable> {
    Json(state.filter.table().clone())
}

/// POST /api/v1/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let form = read_form(multipart).await?;
    let category = form.category.trim().to_string();
    let extra = parse_keyword_list(&form.keywords);
    let sources = form.into_sources();
    if sources.is_empty() {
        return Err(AppError::Validation(
            "Provide at least one file, URL or text".to_string(),
        ));
    }

    let report = run_extraction(
        &sources,
        &state.resolver,
        &state.matcher,
        state.config.context_window,
    )
    .await;

    let keywords = state.filter.active_keywords(&category, &extra);
    let filtered = state
        .filter
        .apply(report.records.clone(), &category, &extra);
    Ok(Json(ExtractResponse {
        records: report.records,
        filtered,
        keywords: keywords.into_iter().collect(),
        processed_sources: report.processed_sources,
        failures: report.failures,
    }))
}

#[derive(Deserialize)]
pub struct FilterRequest {
    pub records: Vec<EmailRecord>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Serialize)]
pub struct FilterResponse {
    pub records: Vec<EmailRecord>,
    pub keywords: Vec<String>,
}

/// POST /api/v1/filter
pub async fn handle_filter(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> Json<FilterResponse> {
    let keywords = state.filter.active_keywords(&req.category, &req.keywords);
    let records = state.filter.apply(req.records, &req.category, &req.keywords);
    Json(FilterResponse {
        records,
        keywords: keywords.into_iter().collect(),
    })
}

#[derive(Deserialize)]
pub struct ExportRequest {
    pub records: Vec<EmailRecord>,
}

/// POST /api/v1/export
pub async fn handle_export(Json(req): Json<ExportRequest>) -> Result<impl IntoResponse, AppError> {
    let csv = records_to_csv_string(&dedupe_records(req.records))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_ordered_documents_urls_text() {
        let form = ExtractForm {
            documents: vec![SourceInput::Text {
                name: "a.txt".to_string(),
                text: "x".to_string(),
            }],
            urls: "https://b.example\n\nhttps://b.example\nhttps://c.example".to_string(),
            text: "contact hr@acme.io".to_string(),
            ..Default::default()
        };
        let ids: Vec<String> = form
            .into_sources()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(
            ids,
            vec![
                "a.txt",
                "https://b.example",
                "https://c.example",
                PASTED_TEXT_SOURCE
            ]
        );
    }

    #[test]
    fn test_blank_text_is_not_a_source() {
        let form = ExtractForm {
            text: "  \n".to_string(),
            ..Default::default()
        };
        assert!(form.into_sources().is_empty());
    }
}
