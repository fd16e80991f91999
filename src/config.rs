//! TOML configuration.
//!
//! Every section and key is optional; missing values take the defaults below.
//!
//! ```toml
//! [dataset]
//! path = "data/news_dataset.csv"
//! encoding = "windows-1252"   # or "utf-8"
//!
//! [classifier]
//! max_input_chars = 512
//! [classifier.label_map]
//! LABEL_0 = "FAKE"
//! LABEL_1 = "REAL"
//!
//! [query]
//! default_limit = 10
//! max_limit = 100             # optional
//!
//! [execution]
//! chunk_size = 64
//! max_in_flight_chunks = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::classify::{Annotator, Classifier, LabelMap, DEFAULT_MAX_INPUT_CHARS};
use crate::error::{FeedError, FeedResult};
use crate::execution::ExecutionOptions;
use crate::ingestion::SourceEncoding;
use crate::processing::DEFAULT_LIMIT;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub dataset: DatasetConfig,
    pub classifier: ClassifierConfig,
    pub query: QueryConfig,
    pub execution: ExecutionOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub encoding: SourceEncoding,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/news_dataset.csv"),
            encoding: SourceEncoding::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Characters of `statement + " " + body` handed to the model.
    pub max_input_chars: usize,
    /// Raw model label -> `FAKE` / `REAL`.
    pub label_map: LabelMap,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            label_map: LabelMap::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the caller gives none (or a non-numeric one).
    pub default_limit: usize,
    /// Optional ceiling on the page size.
    pub max_limit: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

impl FeedConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> FeedResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> FeedResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| FeedError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&text)
    }

    /// Annotator for `classifier` (or none) using the configured label map and input limit.
    pub fn annotator(&self, classifier: Option<Arc<dyn Classifier>>) -> Annotator {
        let base = match classifier {
            Some(c) => Annotator::new(c),
            None => Annotator::without_model(),
        };
        base.with_label_map(self.classifier.label_map.clone())
            .with_max_input_chars(self.classifier.max_input_chars)
    }
}
