use thiserror::Error;

/// Convenience result type for loading and configuration.
pub type FeedResult<T> = Result<T, FeedError>;

/// Error type returned when a whole source cannot be loaded.
///
/// Row, field and record-scoped problems never surface here: a malformed row is skipped, an
/// unparseable date becomes absent and a failed prediction becomes
/// [`crate::types::Label::Unknown`]. Those are counted in [`crate::ingestion::LoadStats`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error that prevents reading the source at all (e.g. unreadable header row).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The source does not carry the columns a record is built from.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// The worker pool used for load-time annotation could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A configuration file could not be read or deserialized.
    #[error("config error: {message}")]
    Config { message: String },
}

impl From<toml::de::Error> for FeedError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config {
            message: e.to_string(),
        }
    }
}

/// Error returned by a [`crate::classify::Classifier`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// The model is not loaded or cannot be reached.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The model ran but did not produce a usable output.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model panicked; the payload message, when it had one.
    #[error("model panicked: {0}")]
    Panicked(String),
}
