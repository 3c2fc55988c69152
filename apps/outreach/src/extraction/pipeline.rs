//! Extraction pipeline: sources → matcher → context → aggregation.
//!
//! Sources are processed one at a time, in the order given. A source that cannot be read
//! is logged, recorded as a `SourceFailure`, and skipped; the run always completes.

use tracing::{info, warn};
use uuid::Uuid;

use crate::extraction::aggregate::Aggregator;
use crate::extraction::context::emails_with_context;
use crate::extraction::matcher::EmailMatcher;
use crate::extraction::models::{EmailRecord, ExtractionReport, SourceFailure};
use crate::sources::{SourceInput, TextResolver};

/// Turns one source's text into records, in matcher order. Pure and synchronous.
pub fn ingest_text(
    matcher: &EmailMatcher,
    source_id: &str,
    text: &str,
    window: usize,
) -> Vec<EmailRecord> {
    emails_with_context(matcher, text, window)
        .into_iter()
        .map(|(address, context)| EmailRecord::new(address, source_id, context))
        .collect()
}

/// Runs a full extraction over `sources` and returns the aggregated collection.
pub async fn run_extraction(
    sources: &[SourceInput],
    resolver: &TextResolver,
    matcher: &EmailMatcher,
    window: usize,
) -> ExtractionReport {
    let run_id = Uuid::new_v4();
    info!("Extraction run {run_id}: {} sources", sources.len());

    let mut aggregator = Aggregator::new();
    let mut report = ExtractionReport::default();

    for source in sources {
        let source_id = source.id();
        let text = match resolver.resolve(source).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Run {run_id}: skipping source '{source_id}': {e}");
                report.failures.push(SourceFailure {
                    source: source_id.to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let records = ingest_text(matcher, source_id, &text, window);
        let found = records.len();
        let added = aggregator.extend(records);
        info!(
            "Run {run_id}: {source_id}: {found} emails ({added} new, {} total)",
            aggregator.len()
        );
        report.processed_sources += 1;
    }

    report.records = aggregator.into_records();
    info!(
        "Extraction run {run_id} done: {} unique emails from {}/{} sources",
        report.total_records(),
        report.processed_sources,
        sources.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{PageFetcher, SourceError};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Arc;

    /// Serves `https://ok.example` and fails everything else.
    struct FakeFetcher;

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
            if url == "https://ok.example" {
                Ok("Dev team lead: lead@initech.com and bob@acme.io".to_string())
            } else {
                Err(SourceError::Fetch(format!("HTTP 404 Not Found for {url}")))
            }
        }
    }

    fn resolver() -> TextResolver {
        TextResolver::new(Arc::new(FakeFetcher))
    }

    fn text(name: &str, body: &str) -> SourceInput {
        SourceInput::Text {
            name: name.to_string(),
            text: body.to_string(),
        }
    }

    #[test]
    fn test_ingest_text_tags_source_and_context() {
        let matcher = EmailMatcher::new().unwrap();
        let records = ingest_text(&matcher, "a.pdf", "Write to hr@acme.io now", 4);
        assert_eq!(
            records,
            vec![EmailRecord::new("hr@acme.io", "a.pdf", " to hr@acme.io now")]
        );
    }

    #[test]
    fn test_ingest_empty_text() {
        let matcher = EmailMatcher::new().unwrap();
        assert!(ingest_text(&matcher, "a.pdf", "", 80).is_empty());
    }

    #[tokio::test]
    async fn test_first_source_wins_for_shared_address() {
        let matcher = EmailMatcher::new().unwrap();
        let sources = vec![
            text("A", "Rust role, contact bob@acme.io"),
            text("B", "Other contact amy@initech.com"),
            text("C", "Marketing: bob@acme.io"),
        ];
        let report = run_extraction(&sources, &resolver(), &matcher, 80).await;

        assert_eq!(report.processed_sources, 3);
        let bobs: Vec<_> = report
            .records
            .iter()
            .filter(|r| r.address == "bob@acme.io")
            .collect();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].source, "A");
        assert_eq!(bobs[0].context, "Rust role, contact bob@acme.io");
    }

    #[tokio::test]
    async fn test_failed_source_does_not_abort_run() {
        let matcher = EmailMatcher::new().unwrap();
        let sources = vec![
            SourceInput::Url("https://down.example".to_string()),
            SourceInput::Document {
                name: "slides.pptx".to_string(),
                bytes: Bytes::new(),
            },
            SourceInput::Url("https://ok.example".to_string()),
        ];
        let report = run_extraction(&sources, &resolver(), &matcher, 80).await;

        assert_eq!(report.processed_sources, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].source, "https://down.example");
        assert_eq!(report.failures[1].source, "slides.pptx");
        assert_eq!(report.total_records(), 2);
        assert!(report
            .records
            .iter()
            .all(|r| r.source == "https://ok.example"));
    }

    #[tokio::test]
    async fn test_rerun_is_deterministic() {
        let matcher = EmailMatcher::new().unwrap();
        let sources = vec![
            text("A", "z@acme.io then a@acme.io"),
            text("B", "m@acme.io and z@acme.io"),
        ];
        let first = run_extraction(&sources, &resolver(), &matcher, 80).await;
        let second = run_extraction(&sources, &resolver(), &matcher, 80).await;
        assert_eq!(first.records, second.records);

        let order: Vec<&str> = first.records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, vec!["a@acme.io", "z@acme.io", "m@acme.io"]);
    }

    #[tokio::test]
    async fn test_no_sources() {
        let matcher = EmailMatcher::new().unwrap();
        let report = run_extraction(&[], &resolver(), &matcher, 80).await;
        assert_eq!(report.processed_sources, 0);
        assert!(report.records.is_empty());
        assert!(report.failures.is_empty());
    }
}
