// Text sources: uploaded documents, fetched web pages and raw text.
// Everything here turns an input into `(source_id, text)` for the extraction pipeline.

pub mod document;
pub mod web;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

pub use document::extract_document_text;
pub use web::{HttpPageFetcher, PageFetcher};

/// Why a single source contributed nothing. Never aborts a run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("could not decode document: {0}")]
    Decode(String),

    #[error("text is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// One input to an extraction run.
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// An uploaded file; the kind is taken from the file name's extension.
    Document { name: String, bytes: Bytes },
    /// A web page, fetched and converted from HTML to text.
    Url(String),
    /// Text already extracted by the caller.
    Text { name: String, text: String },
}

impl SourceInput {
    /// Identifier recorded as `source` on every record this input yields.
    pub fn id(&self) -> &str {
        match self {
            SourceInput::Document { name, .. } => name,
            SourceInput::Url(url) => url,
            SourceInput::Text { name, .. } => name,
        }
    }
}

/// Resolves any `SourceInput` into plain text.
#[derive(Clone)]
pub struct TextResolver {
    fetcher: Arc<dyn PageFetcher>,
}

impl TextResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, input: &SourceInput) -> Result<String, SourceError> {
        match input {
            SourceInput::Document { name, bytes } => {
                extract_document_text(name, bytes.clone()).await
            }
            SourceInput::Url(url) => self.fetcher.fetch_text(url).await,
            SourceInput::Text { text, .. } => Ok(text.clone()),
        }
    }
}

/// One URL per line; blank lines skipped, duplicates dropped keeping the first.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !urls.iter().any(|u| u == line) {
            urls.push(line.to_string());
        }
    }
    urls
}
