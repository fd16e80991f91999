//! Read-only operations over a built [`crate::types::Table`].
//!
//! None of these mutate the table or invoke the classifier; they are pure functions of the
//! table and their arguments, safe to call concurrently on a shared snapshot.
//!
//! - [`query()`]: filter + paginate, in table order
//! - [`count_by()`]: dataset-wide value frequencies
//! - [`distinct_values()`]: normalized filter-option values for comma-delimited fields
//!
//! ## Example
//!
//! ```rust
//! use newsfeed_engine::classify::Annotator;
//! use newsfeed_engine::ingestion::build;
//! use newsfeed_engine::processing::{
//!     count_by, distinct_values, query, CountField, MultiValueField, PageRequest, QueryFilters,
//! };
//! use newsfeed_engine::types::RawRow;
//!
//! let table = build(
//!     vec![
//!         RawRow::from_pairs([("Eng_Trans_Statement", "A"), ("Label", "False"), ("Platform", "Twitter,Facebook")]),
//!         RawRow::from_pairs([("Eng_Trans_Statement", "B"), ("Label", "True"), ("Platform", "whatsapp")]),
//!     ],
//!     &Annotator::without_model(),
//! );
//!
//! let filters = QueryFilters { label: Some("false".to_string()), ..Default::default() };
//! let page = query(&table, &filters, PageRequest::new(1, 10));
//! assert_eq!(page.len(), 1);
//! assert_eq!(page[0].statement, "A");
//!
//! assert_eq!(count_by(&table, CountField::Label).get("True"), Some(&1));
//! assert_eq!(
//!     distinct_values(&table, MultiValueField::Platform),
//!     vec!["Facebook", "Twitter", "Whatsapp"]
//! );
//! ```

pub mod aggregate;
pub mod distinct;
pub mod query;

pub use aggregate::{count_by, CountField};
pub use distinct::{distinct_values, title_case, MultiValueField};
pub use query::{count_matching, matching, query, PageRequest, QueryFilters, DEFAULT_LIMIT};
