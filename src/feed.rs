//! Published table snapshot and the read operations served from it.
//!
//! A [`Feed`] holds the current [`Table`] behind an `Arc`. Readers take a snapshot (a cheap
//! `Arc` clone) and work on it without locking; [`Feed::publish`] swaps in a newly built table
//! without touching the old one, so in-flight readers keep a consistent view.
//!
//! The four operations mirror what the HTTP layer exposes: [`Feed::posts`], [`Feed::trends`],
//! [`Feed::ai_trends`] and [`Feed::filters`]. Their return types serialize to the JSON bodies
//! the front-end consumes.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::classify::Classifier;
use crate::config::{FeedConfig, QueryConfig};
use crate::error::FeedResult;
use crate::execution::{ExecutionEngine, TracingExecutionObserver};
use crate::ingestion::dates::format_publish_date;
use crate::ingestion::{load_from_path, LoadOptions, LoadStats, TableBuilder, TracingObserver};
use crate::processing::{
    count_by, distinct_values, query, CountField, MultiValueField, PageRequest, QueryFilters,
};
use crate::types::{Label, Record, Table};

/// One record as shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub title: String,
    pub body: String,
    /// `YYYY-MM-DD`, or empty when the source date was missing or unparseable.
    pub date: String,
    pub platform: String,
    pub region: String,
    pub image: String,
    pub label: String,
    pub ai_prediction: Label,
}

impl From<&Record> for PostView {
    fn from(r: &Record) -> Self {
        Self {
            title: r.statement.clone(),
            body: r.body.clone(),
            date: format_publish_date(r.publish_date),
            platform: r.platform.clone(),
            region: r.region.clone(),
            image: r.media_link.clone(),
            label: r.label.clone(),
            ai_prediction: r.ai_prediction,
        }
    }
}

/// Dataset-wide ground-truth distributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendsView {
    pub dataset_labels: BTreeMap<String, usize>,
    pub platforms: BTreeMap<String, usize>,
    pub regions: BTreeMap<String, usize>,
}

/// Dataset-wide prediction distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiTrendsView {
    pub ai_prediction_counts: BTreeMap<String, usize>,
}

/// Distinct normalized values for the filter dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiltersView {
    pub platforms: Vec<String>,
    pub regions: Vec<String>,
    pub languages: Vec<String>,
}

/// A posts request as it arrives from a query string: filters plus raw paging values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsRequest {
    pub filters: QueryFilters,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Shared handle to the currently published table.
#[derive(Debug)]
pub struct Feed {
    current: RwLock<Arc<Table>>,
    query: QueryConfig,
}

impl Feed {
    /// Publish `table` with default query settings.
    pub fn new(table: Table) -> Self {
        Self::with_query_config(table, QueryConfig::default())
    }

    pub fn with_query_config(table: Table, query: QueryConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
            query,
        }
    }

    /// Load the configured dataset and publish it.
    ///
    /// Predictions are computed here, once per record, on a worker pool sized by
    /// `config.execution`. Skipped rows and the load summary go to `tracing`.
    pub fn load(config: &FeedConfig, classifier: Option<Arc<dyn Classifier>>) -> FeedResult<(Self, LoadStats)> {
        let engine = ExecutionEngine::new(config.execution.clone())?
            .with_observer(Arc::new(TracingExecutionObserver));
        let builder = TableBuilder::new(config.annotator(classifier)).with_engine(Arc::new(engine));
        let options = LoadOptions {
            encoding: config.dataset.encoding,
            observer: Some(Arc::new(TracingObserver)),
            ..LoadOptions::default()
        };

        let built = load_from_path(&config.dataset.path, &builder, &options)?;
        Ok((
            Self::with_query_config(built.table, config.query.clone()),
            built.stats,
        ))
    }

    /// The currently published table.
    pub fn snapshot(&self) -> Arc<Table> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the published table. Returns the previous one.
    pub fn publish(&self, table: Table) -> Arc<Table> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(table))
    }

    /// Filtered, paginated posts. Paging values are parsed and clamped per [`PageRequest::from_params`].
    pub fn posts(&self, request: &PostsRequest) -> Vec<PostView> {
        let page = PageRequest::from_params(
            request.page.as_deref(),
            request.limit.as_deref(),
            self.query.default_limit,
            self.query.max_limit,
        );
        self.posts_page(&request.filters, page)
    }

    /// Filtered posts for an already-validated page window.
    pub fn posts_page(&self, filters: &QueryFilters, page: PageRequest) -> Vec<PostView> {
        let table = self.snapshot();
        query(&table, filters, page)
            .into_iter()
            .map(PostView::from)
            .collect()
    }

    /// Label, platform and region counts over the whole table.
    pub fn trends(&self) -> TrendsView {
        let table = self.snapshot();
        TrendsView {
            dataset_labels: count_by(&table, CountField::Label),
            platforms: count_by(&table, CountField::Platform),
            regions: count_by(&table, CountField::Region),
        }
    }

    /// Prediction counts over the whole table.
    pub fn ai_trends(&self) -> AiTrendsView {
        AiTrendsView {
            ai_prediction_counts: count_by(&self.snapshot(), CountField::AiPrediction),
        }
    }

    /// Distinct normalized platform, region and language values.
    pub fn filters(&self) -> FiltersView {
        let table = self.snapshot();
        FiltersView {
            platforms: distinct_values(&table, MultiValueField::Platform),
            regions: distinct_values(&table, MultiValueField::Region),
            languages: distinct_values(&table, MultiValueField::Language),
        }
    }
}
