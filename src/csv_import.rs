//! CSV import of transfer rows.
//!
//! Format: one `address,amount` pair per line, with an optional
//! `address,amount` header (any letter case). The whole import is rejected on
//! the first bad line; callers only ever see a complete batch or an error.

use crate::types::TransferEntry;
use crate::utils;
use std::path::Path;
use thiserror::Error;

/// File extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Expected line format, quoted in error messages.
pub const LINE_FORMAT: &str = "address,amount";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvImportError {
    #[error("File is empty")]
    EmptyFile,
    #[error("File contains a header but no transfers")]
    NoTransfers,
    #[error("Line {line}: malformed line, expected `address,amount`")]
    MalformedLine { line: usize },
    #[error("Line {line}: invalid amount '{value}'")]
    InvalidAmount { line: usize, value: String },
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Failed to read file: {0}")]
    Read(String),
}

/// Parse CSV text into transfer entries with ids `1..=n` in file order.
pub fn parse_transfers(text: &str) -> Result<Vec<TransferEntry>, CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    let mut seen_record = false;

    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| CsvImportError::Parse {
            line: e.position().map(|p| p.line() as usize).unwrap_or(index + 1),
            message: e.to_string(),
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 1);

        let address = record.get(0).unwrap_or("");
        let amount = record.get(1).unwrap_or("");

        if !seen_record {
            seen_record = true;
            if address.eq_ignore_ascii_case("address") && amount.eq_ignore_ascii_case("amount") {
                tracing::debug!("Skipping CSV header on line {}", line);
                continue;
            }
        }

        if address.is_empty() || amount.is_empty() {
            return Err(CsvImportError::MalformedLine { line });
        }
        if !utils::is_decimal_literal(amount) {
            return Err(CsvImportError::InvalidAmount {
                line,
                value: amount.to_string(),
            });
        }

        let id = entries.len() as u64 + 1;
        entries.push(TransferEntry::new(id, address, amount));
    }

    if !seen_record {
        return Err(CsvImportError::EmptyFile);
    }
    if entries.is_empty() {
        return Err(CsvImportError::NoTransfers);
    }

    tracing::info!("Parsed {} transfers from CSV", entries.len());
    Ok(entries)
}

/// Read an import file without blocking the caller's thread.
pub async fn read_file(path: &Path) -> Result<String, CsvImportError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CsvImportError::Read(format!("{}: {}", path.display(), e)))
}
