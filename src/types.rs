//! Core data model types.
//!
//! A source row arrives as a [`RawRow`] (every field possibly missing), is normalized into a
//! fixed-shape [`Record`] and ends up in an immutable, ordered [`Table`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Prediction attached to every record.
///
/// This is the only vocabulary downstream code sees; raw model labels are mapped into it by
/// [`crate::classify::LabelMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    /// The model judged the item fake.
    Fake,
    /// The model judged the item real.
    Real,
    /// No usable prediction (empty text, unmapped model output, model failure or no model).
    Unknown,
}

impl Label {
    /// Upper-case wire form (`FAKE`, `REAL`, `UNKNOWN`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fake => "FAKE",
            Self::Real => "REAL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAKE" => Ok(Self::Fake),
            "REAL" => Ok(Self::Real),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(format!("expected FAKE, REAL or UNKNOWN, got '{other}'")),
        }
    }
}

/// Source columns a [`Record`] is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Statement,
    Body,
    PublishDate,
    Language,
    Platform,
    Region,
    MediaLink,
    Label,
}

impl RecordField {
    /// Every source field, in source column order.
    pub const ALL: [RecordField; 8] = [
        Self::Statement,
        Self::Body,
        Self::PublishDate,
        Self::Language,
        Self::Platform,
        Self::Region,
        Self::MediaLink,
        Self::Label,
    ];

    /// Header name of this field in the source dataset.
    pub fn column_name(self) -> &'static str {
        match self {
            Self::Statement => "Eng_Trans_Statement",
            Self::Body => "Eng_Trans_News_Body",
            Self::PublishDate => "Publish_Date",
            Self::Language => "Language",
            Self::Platform => "Platform",
            Self::Region => "Region",
            Self::MediaLink => "Media_Link",
            Self::Label => "Label",
        }
    }

    /// Looks a field up by its source header name (exact match).
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }

    /// Whether a row lacking this field is excluded from the table.
    pub fn is_required(self) -> bool {
        matches!(self, Self::Statement | Self::Label)
    }
}

/// One source row projected onto the known field set.
///
/// `None` means the cell was missing, empty or whitespace-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub statement: Option<String>,
    pub body: Option<String>,
    pub publish_date: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub region: Option<String>,
    pub media_link: Option<String>,
    pub label: Option<String>,
}

impl RawRow {
    /// Build a row from `(column name, value)` pairs, ignoring columns outside the known field set.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut row = Self::default();
        for (name, value) in pairs {
            if let Some(field) = RecordField::from_column_name(name) {
                row.set(field, value);
            }
        }
        row
    }

    /// Set `field` to `value`; empty or whitespace-only values are stored as absent.
    pub fn set(&mut self, field: RecordField, value: &str) {
        let value = (!value.trim().is_empty()).then(|| value.to_owned());
        *self.slot_mut(field) = value;
    }

    /// Current value of `field`.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        let slot = match field {
            RecordField::Statement => &self.statement,
            RecordField::Body => &self.body,
            RecordField::PublishDate => &self.publish_date,
            RecordField::Language => &self.language,
            RecordField::Platform => &self.platform,
            RecordField::Region => &self.region,
            RecordField::MediaLink => &self.media_link,
            RecordField::Label => &self.label,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, field: RecordField) -> &mut Option<String> {
        match field {
            RecordField::Statement => &mut self.statement,
            RecordField::Body => &mut self.body,
            RecordField::PublishDate => &mut self.publish_date,
            RecordField::Language => &mut self.language,
            RecordField::Platform => &mut self.platform,
            RecordField::Region => &mut self.region,
            RecordField::MediaLink => &mut self.media_link,
            RecordField::Label => &mut self.label,
        }
    }
}

/// One normalized news item.
///
/// `statement` and `label` are never empty. Optional text fields default to `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub statement: String,
    pub body: String,
    /// `None` when the source date was missing or unparseable.
    pub publish_date: Option<NaiveDate>,
    /// Raw, possibly comma-delimited.
    pub language: String,
    /// Raw, possibly comma-delimited.
    pub platform: String,
    /// Raw, possibly comma-delimited.
    pub region: String,
    pub media_link: String,
    /// Ground-truth label as it appears in the source.
    pub label: String,
    /// Computed once at load time.
    pub ai_prediction: Label,
}

/// Immutable, ordered collection of [`Record`]s.
///
/// Records are kept in source order. There is no way to add, remove or modify a record once the
/// table is built; share it behind an `Arc` (see [`crate::feed::Feed`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    /// Create a table from already-normalized records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Records in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
