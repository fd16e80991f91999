//! Lenient CSV decoding of the news dataset.
//!
//! Rules:
//!
//! - CSV must have headers, and the headers must contain every source column of
//!   [`RecordField::ALL`] (order can differ, extra columns are ignored).
//! - A row with more fields than the header is malformed and skipped; a row with fewer fields
//!   leaves the trailing columns absent.
//! - A row whose bytes cannot be decoded in the configured [`SourceEncoding`] is skipped.
//! - Skipped rows are reported, never fatal. Only I/O failures and a bad header abort the read.

use std::path::Path;

use serde::Deserialize;

use crate::error::{FeedError, FeedResult};
use crate::types::{RawRow, RecordField};

use super::store::{SkipReason, SkippedRow};

/// Text encoding of the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SourceEncoding {
    /// Strict UTF-8. Rows containing invalid sequences are skipped.
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// Windows-1252 (cp1252). Fields that are already valid UTF-8 are taken as-is.
    #[default]
    #[serde(rename = "windows-1252", alias = "cp1252")]
    Windows1252,
}

impl SourceEncoding {
    /// Decode one field.
    pub fn decode(self, bytes: &[u8]) -> Result<String, String> {
        if let Ok(s) = std::str::from_utf8(bytes) {
            return Ok(s.to_owned());
        }
        match self {
            Self::Utf8 => Err("invalid utf-8".to_string()),
            Self::Windows1252 => decode_windows_1252(bytes),
        }
    }
}

// 0x80..=0x9F; `None` marks the five bytes cp1252 leaves undefined.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

fn decode_windows_1252(bytes: &[u8]) -> Result<String, String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)]
                .ok_or_else(|| format!("byte 0x{b:02X} is undefined in windows-1252")),
            _ => Ok(char::from(b)),
        })
        .collect()
}

/// Rows decoded from a source, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRows {
    /// Decoded rows paired with their 1-based source line number.
    pub rows: Vec<(usize, RawRow)>,
    /// Rows that could not be decoded.
    pub skipped: Vec<SkippedRow>,
}

impl RawRows {
    /// Total data rows seen in the source (decoded + skipped).
    pub fn rows_read(&self) -> usize {
        self.rows.len() + self.skipped.len()
    }
}

/// Read a CSV dataset file into [`RawRows`].
pub fn read_raw_rows_from_path(path: impl AsRef<Path>, encoding: SourceEncoding) -> FeedResult<RawRows> {
    let mut rdr = reader_builder().from_path(path)?;
    read_raw_rows_from_reader(&mut rdr, encoding)
}

/// Read CSV data from an existing CSV reader.
///
/// The reader should be built with `flexible(true)`, otherwise short rows are reported as
/// malformed instead of being padded.
pub fn read_raw_rows_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    encoding: SourceEncoding,
) -> FeedResult<RawRows> {
    let headers = decode_headers(rdr.byte_headers()?, encoding)?;

    // Map record fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(RecordField::ALL.len());
    for field in RecordField::ALL {
        match headers.iter().position(|h| h == field.column_name()) {
            Some(idx) => col_idxs.push((field, idx)),
            None => {
                return Err(FeedError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        field.column_name(),
                        headers
                    ),
                });
            }
        }
    }

    let mut out = RawRows::default();
    for (row_idx0, result) in rdr.byte_records().enumerate() {
        // Header is line 1.
        let fallback_row = row_idx0 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                let row = e
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(fallback_row);
                out.skipped.push(SkippedRow {
                    row,
                    reason: SkipReason::Malformed(e.to_string()),
                });
                continue;
            }
        };
        let row = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_row);

        if record.len() > headers.len() {
            out.skipped.push(SkippedRow {
                row,
                reason: SkipReason::Malformed(format!(
                    "expected {} fields, saw {}",
                    headers.len(),
                    record.len()
                )),
            });
            continue;
        }

        match decode_row(&record, &col_idxs, encoding) {
            Ok(raw) => out.rows.push((row, raw)),
            Err(message) => out.skipped.push(SkippedRow {
                row,
                reason: SkipReason::Malformed(message),
            }),
        }
    }

    Ok(out)
}

/// Reader settings the dataset needs: headers, ragged rows tolerated.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn decode_headers(raw: &csv::ByteRecord, encoding: SourceEncoding) -> FeedResult<Vec<String>> {
    raw.iter()
        .enumerate()
        .map(|(i, bytes)| {
            let name = encoding.decode(bytes).map_err(|message| FeedError::SchemaMismatch {
                message: format!("cannot decode header column {}: {message}", i + 1),
            })?;
            let name = if i == 0 { name.trim_start_matches('\u{feff}') } else { name.as_str() };
            Ok(name.trim().to_owned())
        })
        .collect()
}

fn decode_row(
    record: &csv::ByteRecord,
    col_idxs: &[(RecordField, usize)],
    encoding: SourceEncoding,
) -> Result<RawRow, String> {
    let mut raw = RawRow::default();
    for &(field, idx) in col_idxs {
        let Some(bytes) = record.get(idx) else {
            continue;
        };
        let value = encoding
            .decode(bytes)
            .map_err(|e| format!("column '{}': {e}", field.column_name()))?;
        raw.set(field, &value);
    }
    Ok(raw)
}
