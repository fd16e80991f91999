//! Prediction annotation.
//!
//! A [`Classifier`] is the opaque model capability: it takes text and returns the model's own
//! label string. [`Annotator`] wraps it with the rules every record goes through:
//!
//! - empty or whitespace-only text is [`Label::Unknown`] and never reaches the model
//! - text is truncated to [`Annotator::max_input_chars`] characters before inference
//! - the raw model label is mapped through a fixed [`LabelMap`]; unmapped output is `Unknown`
//! - a model error or panic degrades to `Unknown` for that text

use std::collections::BTreeMap;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClassifierError;
use crate::types::Label;

/// Default model input limit, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 512;

/// A text classification model.
///
/// Implementations return the model's raw output label (e.g. `LABEL_0`). They are invoked from
/// worker threads during load, hence `Send + Sync`.
pub trait Classifier: Send + Sync {
    /// Run inference on `text`.
    fn classify(&self, text: &str) -> Result<String, ClassifierError>;

    /// Model name for logging.
    fn name(&self) -> &str {
        "classifier"
    }
}

impl<F> Classifier for F
where
    F: Fn(&str) -> Result<String, ClassifierError> + Send + Sync,
{
    fn classify(&self, text: &str) -> Result<String, ClassifierError> {
        self(text)
    }
}

/// Fixed mapping from raw model labels to [`Label`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    entries: BTreeMap<String, Label>,
}

impl LabelMap {
    /// Create a mapping from `(raw model label, label)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Label)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Map a raw model label. Matching is exact; unknown labels map to [`Label::Unknown`].
    pub fn map(&self, raw: &str) -> Label {
        self.entries.get(raw).copied().unwrap_or(Label::Unknown)
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new([("LABEL_0", Label::Fake), ("LABEL_1", Label::Real)])
    }
}

/// Applies a [`Classifier`] under the annotation rules described in the module docs.
#[derive(Clone)]
pub struct Annotator {
    classifier: Option<Arc<dyn Classifier>>,
    label_map: LabelMap,
    max_input_chars: usize,
}

impl fmt::Debug for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Annotator")
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("label_map", &self.label_map)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::without_model()
    }
}

impl Annotator {
    /// Annotator backed by `classifier`, with the default label map and input limit.
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
            label_map: LabelMap::default(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Annotator with no model attached; every prediction is [`Label::Unknown`].
    pub fn without_model() -> Self {
        Self {
            classifier: None,
            label_map: LabelMap::default(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Replace the raw-label mapping.
    pub fn with_label_map(mut self, label_map: LabelMap) -> Self {
        self.label_map = label_map;
        self
    }

    /// Set the input truncation limit (in characters). Values below 1 are raised to 1.
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars.max(1);
        self
    }

    /// Input truncation limit, in characters.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Whether a model is attached.
    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    /// Predict a label for `text`, propagating model errors. A panic inside the model is
    /// caught and returned as [`ClassifierError::Panicked`].
    pub fn try_predict(&self, text: &str) -> Result<Label, ClassifierError> {
        if text.trim().is_empty() {
            return Ok(Label::Unknown);
        }
        let Some(classifier) = self.classifier.as_ref() else {
            return Ok(Label::Unknown);
        };
        let input = truncate_chars(text, self.max_input_chars);
        let raw = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(input)))
            .map_err(|payload| ClassifierError::Panicked(panic_message(&*payload)))??;
        Ok(self.label_map.map(&raw))
    }

    /// Predict a label for `text`; a model error yields [`Label::Unknown`].
    pub fn predict(&self, text: &str) -> Label {
        match self.try_predict(text) {
            Ok(label) => label,
            Err(e) => {
                warn!(error = %e, "classification failed, recording UNKNOWN");
                Label::Unknown
            }
        }
    }
}

/// Text handed to the classifier for one record: statement and body joined by a single space.
pub fn classification_text(statement: &str, body: &str) -> String {
    format!("{statement} {body}")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// The first `max_chars` characters of `text` (never splits a UTF-8 sequence).
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
