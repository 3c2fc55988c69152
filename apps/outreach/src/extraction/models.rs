use serde::{Deserialize, Serialize};

/// One extracted address plus where it was found.
///
/// Field order is the export column order: `email, source, context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    #[serde(rename = "email")]
    pub address: String,
    pub source: String,
    /// Snippet around the first occurrence, newlines flattened to spaces.
    pub context: String,
}

impl EmailRecord {
    pub fn new(
        address: impl Into<String>,
        source: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            source: source.into(),
            context: context.into(),
        }
    }
}

/// A source that contributed zero records because it could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Outcome of one extraction run over an ordered list of sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Aggregated records, unique by address, in order of first appearance.
    pub records: Vec<EmailRecord>,
    pub processed_sources: usize,
    pub failures: Vec<SourceFailure>,
}

impl ExtractionReport {
    pub fn total_records(&self) -> usize {
        self.records.len()
    }
}
