//! `newsfeed-engine` loads a labeled news dataset once, attaches a precomputed fake/real
//! prediction to every item, and answers read-only feed queries against the result.
//!
//! The primary entrypoint is [`feed::Feed::load`], which reads the configured CSV, builds an
//! immutable [`types::Table`] and publishes it for querying.
//!
//! ## Loading
//!
//! - Rows are projected onto the known source columns; extra columns are ignored.
//! - Rows without a statement or label are dropped; malformed rows are skipped. Neither aborts
//!   the load.
//! - Publish dates are parsed leniently; an unparseable date becomes absent.
//! - Missing optional fields become empty strings.
//! - Each surviving record gets an [`types::Label`] (`FAKE`, `REAL` or `UNKNOWN`) from the
//!   configured [`classify::Classifier`], computed exactly once.
//!
//! ## Querying
//!
//! - [`feed::Feed::posts`]: filter by platform / region / label / free text, paginate
//! - [`feed::Feed::trends`]: label, platform and region counts over the whole table
//! - [`feed::Feed::ai_trends`]: prediction counts over the whole table
//! - [`feed::Feed::filters`]: distinct normalized platform, region and language values
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use newsfeed_engine::classify::Classifier;
//! use newsfeed_engine::config::FeedConfig;
//! use newsfeed_engine::feed::{Feed, PostsRequest};
//! use newsfeed_engine::processing::QueryFilters;
//!
//! # fn main() -> Result<(), newsfeed_engine::FeedError> {
//! let config = FeedConfig::load("newsfeed.toml")?;
//! let model: Option<Arc<dyn Classifier>> = None;
//! let (feed, stats) = Feed::load(&config, model)?;
//! println!("records={} skipped={}", stats.records, stats.rows_malformed + stats.rows_missing_required);
//!
//! let posts = feed.posts(&PostsRequest {
//!     filters: QueryFilters { label: Some("false".to_string()), ..Default::default() },
//!     page: Some("1".to_string()),
//!     limit: Some("10".to_string()),
//! });
//! println!("{}", serde_json::to_string(&posts).unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: records, labels and the table
//! - [`ingestion`]: CSV decoding, normalization and table building
//! - [`classify`]: the classifier seam and label mapping
//! - [`execution`]: parallel load-time annotation
//! - [`processing`]: query, aggregation and filter-value extraction
//! - [`feed`]: the published snapshot and its read operations
//! - [`config`]: TOML configuration
//! - [`error`]: error types

pub mod classify;
pub mod config;
pub mod error;
pub mod execution;
pub mod feed;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{ClassifierError, FeedError, FeedResult};
