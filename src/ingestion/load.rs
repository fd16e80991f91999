//! Path-based loading entrypoint.
//!
//! [`load_from_path`] decodes a CSV dataset, builds the table with a [`TableBuilder`] and, when
//! an [`LoadObserver`] is configured, reports skipped rows, success and failure to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{FeedError, FeedResult};

use super::csv::{read_raw_rows_from_path, SourceEncoding};
use super::observability::{LoadContext, LoadObserver, LoadSeverity};
use super::store::{BuiltTable, TableBuilder};

/// Options controlling a load.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// Source text encoding.
    pub encoding: SourceEncoding,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("encoding", &self.encoding)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encoding: SourceEncoding::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load a CSV dataset into a table.
///
/// When an observer is configured, this function reports:
///
/// - `on_row_skipped` for each excluded row (malformed or missing a required value)
/// - `on_success` with [`super::LoadStats`] once the table is built
/// - `on_failure` when the source cannot be read at all, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use newsfeed_engine::classify::Annotator;
/// use newsfeed_engine::ingestion::{load_from_path, LoadOptions, TableBuilder, TracingObserver};
///
/// # fn main() -> Result<(), newsfeed_engine::FeedError> {
/// let opts = LoadOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     ..Default::default()
/// };
/// let built = load_from_path("data/news_dataset.csv", &TableBuilder::new(Annotator::without_model()), &opts)?;
/// println!("records={} skipped={}", built.table.len(), built.skipped.len());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(
    path: impl AsRef<Path>,
    builder: &TableBuilder,
    options: &LoadOptions,
) -> FeedResult<BuiltTable> {
    let path = path.as_ref();
    let ctx = LoadContext {
        path: path.to_path_buf(),
        encoding: options.encoding,
    };

    let raw = match read_raw_rows_from_path(path, options.encoding) {
        Ok(raw) => raw,
        Err(e) => {
            if let Some(obs) = options.observer.as_ref() {
                let sev = severity_for_error(&e);
                obs.on_failure(&ctx, sev, &e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, &e);
                }
            }
            return Err(e);
        }
    };

    let built = builder.build_numbered(raw.rows, raw.skipped);

    if let Some(obs) = options.observer.as_ref() {
        for row in &built.skipped {
            obs.on_row_skipped(&ctx, row);
        }
        obs.on_success(&ctx, &built.stats);
    }

    Ok(built)
}

fn severity_for_error(e: &FeedError) -> LoadSeverity {
    match e {
        FeedError::Io(_) | FeedError::ThreadPool(_) => LoadSeverity::Critical,
        FeedError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => LoadSeverity::Critical,
            _ => LoadSeverity::Error,
        },
        FeedError::SchemaMismatch { .. } | FeedError::Config { .. } => LoadSeverity::Error,
    }
}
