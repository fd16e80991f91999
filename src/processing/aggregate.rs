//! Dataset-wide frequency counts.

use std::collections::BTreeMap;

use crate::types::{Record, Table};

/// Fields [`count_by`] can group on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountField {
    /// Ground-truth label.
    Label,
    /// Raw platform value (not split on commas).
    Platform,
    /// Raw region value (not split on commas).
    Region,
    /// Precomputed prediction (`FAKE`, `REAL`, `UNKNOWN`).
    AiPrediction,
}

impl CountField {
    fn value<'a>(self, record: &'a Record) -> &'a str {
        match self {
            Self::Label => &record.label,
            Self::Platform => &record.platform,
            Self::Region => &record.region,
            Self::AiPrediction => record.ai_prediction.as_str(),
        }
    }
}

/// Count records per exact value of `field` over the whole table.
///
/// Values are taken exactly as stored: no case folding, trimming or comma splitting. Records
/// with an empty value are counted under `""`.
pub fn count_by(table: &Table, field: CountField) -> BTreeMap<String, usize> {
    table.iter().fold(BTreeMap::new(), |mut acc, record| {
        *acc.entry(field.value(record).to_owned()).or_insert(0) += 1;
        acc
    })
}
