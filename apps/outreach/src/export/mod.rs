//! Tabular export: CSV with the columns `email, source, context`, plus the dispatch log
//! (`email, company, letter_path, status, at`).
//!
//! An empty collection still produces a valid file: the header row alone.

use std::io::{Read, Write};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use thiserror::Error;

use crate::extraction::models::EmailRecord;
use crate::outreach::dispatch::SendLogEntry;

pub const EXPORT_HEADER: [&str; 3] = ["email", "source", "context"];
pub const SEND_LOG_HEADER: [&str; 5] = ["email", "company", "letter_path", "status", "at"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn write_records<W: Write>(writer: W, records: &[EmailRecord]) -> Result<(), ExportError> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(EXPORT_HEADER)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads records back, trimming surrounding whitespace from every field.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<EmailRecord>, ExportError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

pub fn records_to_csv_string(records: &[EmailRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(String::from_utf8(buffer)?)
}

/// One row per dispatch attempt. Missing letters leave `letter_path` empty.
pub fn write_send_log<W: Write>(writer: W, log: &[SendLogEntry]) -> Result<(), ExportError> {
    let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(SEND_LOG_HEADER)?;
    for entry in log {
        let letter = entry
            .letter
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        csv_writer.write_record([
            entry.email.as_str(),
            entry.company.as_str(),
            letter.as_str(),
            entry.status.to_string().as_str(),
            entry.at.to_rfc3339().as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn send_log_to_csv_string(log: &[SendLogEntry]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_send_log(&mut buffer, log)?;
    Ok(String::from_utf8(buffer)?)
}
