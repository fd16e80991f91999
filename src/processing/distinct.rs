//! Distinct filter-option values for multi-valued fields.

use std::collections::BTreeSet;

use crate::types::{Record, Table};

/// Comma-delimited fields that feed UI filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiValueField {
    Platform,
    Region,
    Language,
}

impl MultiValueField {
    fn value<'a>(self, record: &'a Record) -> &'a str {
        match self {
            Self::Platform => &record.platform,
            Self::Region => &record.region,
            Self::Language => &record.language,
        }
    }
}

/// Sorted, deduplicated set of normalized tokens found in `field` across the table.
///
/// Each raw value is split on `,`, every token is trimmed and title-cased, and empty tokens
/// are discarded.
pub fn distinct_values(table: &Table, field: MultiValueField) -> Vec<String> {
    table
        .iter()
        .flat_map(|record| split_tokens(field.value(record)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Split a raw multi-valued field into normalized tokens.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(title_case)
}

/// Title-case `s`: a letter following a non-letter (or at the start) is upper-cased, every
/// other letter is lower-cased. Non-letters are kept as they are.
///
/// `title_case(title_case(s)) == title_case(s)` whenever case mapping is one-to-one (ASCII,
/// most Latin text). Expanding mappings such as `ß` -> `SS` are not idempotent.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
