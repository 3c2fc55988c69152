use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::extraction::models::EmailRecord;

/// Merges records from many sources into one collection unique by address.
///
/// First seen wins: a later record with an address already present is dropped, and the
/// collection keeps the order in which addresses first appeared.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: IndexMap<String, EmailRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the record was discarded as a duplicate.
    pub fn push(&mut self, record: EmailRecord) -> bool {
        match self.records.entry(record.address.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    /// Pushes every record in order, returning how many were new.
    pub fn extend(&mut self, records: impl IntoIterator<Item = EmailRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.push(record) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<EmailRecord> {
        self.records.into_values().collect()
    }
}

/// Collapses an already-materialised collection, e.g. records posted back by a client.
pub fn dedupe_records(records: Vec<EmailRecord>) -> Vec<EmailRecord> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.into_records()
}
