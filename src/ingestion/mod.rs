//! Loading the dataset into an immutable [`crate::types::Table`].
//!
//! Most callers should use [`load_from_path`] (from [`load`]) which:
//!
//! - decodes the CSV source leniently, skipping malformed rows
//! - drops rows without a statement or label, parses dates, fills optional fields
//! - attaches a prediction to every record exactly once
//! - optionally reports skipped rows, success and failure to a [`LoadObserver`]
//!
//! Building from rows that did not come from a file goes through [`TableBuilder`] or [`build`].

pub mod csv;
pub mod dates;
pub mod load;
pub mod observability;
pub mod store;

pub use self::csv::{RawRows, SourceEncoding};
pub use load::{load_from_path, LoadOptions};
pub use observability::{CompositeObserver, LoadContext, LoadObserver, LoadSeverity, TracingObserver};
pub use store::{build, BuiltTable, LoadStats, SkipReason, SkippedRow, TableBuilder};
