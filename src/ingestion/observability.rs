use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::FeedError;

use super::csv::SourceEncoding;
use super::store::{LoadStats, SkipReason, SkippedRow};

/// Severity of a failed load, used for observer callbacks and alerting thresholds.
///
/// Skipped rows are not failures; they are reported through
/// [`LoadObserver::on_row_skipped`] and carry a [`SkipReason`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// The source was readable but unusable (e.g. a required column is missing).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// The dataset path.
    pub path: PathBuf,
    /// Text encoding used to decode the source.
    pub encoding: SourceEncoding,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called for every source row excluded from the table.
    fn on_row_skipped(&self, _ctx: &LoadContext, _row: &SkippedRow) {}

    /// Called when the table was built.
    fn on_success(&self, _ctx: &LoadContext, _stats: &LoadStats) {}

    /// Called when the source could not be loaded at all.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &FeedError) {}

    /// Called when a load failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FeedError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_row_skipped(&self, ctx: &LoadContext, row: &SkippedRow) {
        for o in &self.observers {
            o.on_row_skipped(ctx, row);
        }
    }

    fn on_success(&self, ctx: &LoadContext, stats: &LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FeedError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FeedError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_row_skipped(&self, ctx: &LoadContext, row: &SkippedRow) {
        match &row.reason {
            SkipReason::Malformed(message) => debug!(
                path = %ctx.path.display(),
                row = row.row,
                %message,
                "skipping malformed row"
            ),
            SkipReason::MissingRequired(field) => debug!(
                path = %ctx.path.display(),
                row = row.row,
                column = field.column_name(),
                "skipping row without required value"
            ),
        }
    }

    fn on_success(&self, ctx: &LoadContext, stats: &LoadStats) {
        info!(
            path = %ctx.path.display(),
            encoding = ?ctx.encoding,
            records = stats.records,
            rows_read = stats.rows_read,
            rows_malformed = stats.rows_malformed,
            rows_missing_required = stats.rows_missing_required,
            dates_unparsed = stats.dates_unparsed,
            predictions_failed = stats.predictions_failed,
            "dataset loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FeedError) {
        warn!(path = %ctx.path.display(), ?severity, %error, "dataset load failed");
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &FeedError) {
        error!(path = %ctx.path.display(), ?severity, %error, "ALERT: dataset load failed");
    }
}
