//! Table construction: normalization, exclusion and one-time annotation.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use crate::classify::{classification_text, Annotator};
use crate::execution::ExecutionEngine;
use crate::types::{Label, RawRow, Record, RecordField, Table};

use super::dates::parse_publish_date;

/// Why a source row is not in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The row could not be decoded (wrong field count, bad bytes, CSV syntax).
    Malformed(String),
    /// A required field (`statement` or `label`) was missing or blank.
    MissingRequired(RecordField),
}

/// A source row excluded from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number in the source.
    pub row: usize,
    pub reason: SkipReason,
}

/// Counters describing one table build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows seen in the source.
    pub rows_read: usize,
    /// Rows skipped because they could not be decoded.
    pub rows_malformed: usize,
    /// Rows dropped because `statement` or `label` was absent.
    pub rows_missing_required: usize,
    /// Records whose publish date was present but unparseable.
    pub dates_unparsed: usize,
    /// Records whose prediction degraded to `UNKNOWN` because the model failed.
    pub predictions_failed: usize,
    /// Records in the built table.
    pub records: usize,
}

/// A freshly built table plus what happened while building it.
#[derive(Debug, Clone, Default)]
pub struct BuiltTable {
    pub table: Table,
    pub stats: LoadStats,
    pub skipped: Vec<SkippedRow>,
}

/// Builds [`Table`]s from raw rows.
///
/// Annotation runs sequentially unless an [`ExecutionEngine`] is attached, in which case it is
/// spread over the engine's pool. Either way record order is the input order.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    annotator: Annotator,
    engine: Option<Arc<ExecutionEngine>>,
}

impl TableBuilder {
    pub fn new(annotator: Annotator) -> Self {
        Self {
            annotator,
            engine: None,
        }
    }

    /// Run annotation on `engine`'s worker pool.
    pub fn with_engine(mut self, engine: Arc<ExecutionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Build a table from rows numbered by their position in `rows` (1-based).
    pub fn build<I>(&self, rows: I) -> BuiltTable
    where
        I: IntoIterator<Item = RawRow>,
    {
        let numbered = rows.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect();
        self.build_numbered(numbered, Vec::new())
    }

    /// Build a table from rows carrying their source row numbers.
    ///
    /// `skipped` holds rows already rejected upstream (e.g. by the CSV decoder); they are
    /// counted as malformed and reported alongside rows dropped here.
    pub fn build_numbered(&self, rows: Vec<(usize, RawRow)>, mut skipped: Vec<SkippedRow>) -> BuiltTable {
        let mut stats = LoadStats {
            rows_read: rows.len() + skipped.len(),
            rows_malformed: skipped.len(),
            ..LoadStats::default()
        };

        let mut pending = Vec::with_capacity(rows.len());
        for (row, raw) in rows {
            match normalize(raw) {
                Ok(p) => {
                    if p.date_unparsed {
                        stats.dates_unparsed += 1;
                    }
                    pending.push(p);
                }
                Err(field) => {
                    stats.rows_missing_required += 1;
                    skipped.push(SkippedRow {
                        row,
                        reason: SkipReason::MissingRequired(field),
                    });
                }
            }
        }

        let annotate = |p: &Pending| self.annotate(p);
        let predictions = match &self.engine {
            Some(engine) if self.annotator.has_model() => engine.map_ordered(&pending, annotate),
            _ => pending.iter().map(annotate).collect(),
        };

        let records: Vec<Record> = pending
            .into_iter()
            .zip(predictions)
            .map(|(p, (prediction, failed))| {
                if failed {
                    stats.predictions_failed += 1;
                }
                p.into_record(prediction)
            })
            .collect();

        stats.records = records.len();
        skipped.sort_by_key(|s| s.row);

        BuiltTable {
            table: Table::new(records),
            stats,
            skipped,
        }
    }

    fn annotate(&self, p: &Pending) -> (Label, bool) {
        let text = classification_text(&p.statement, &p.body);
        match self.annotator.try_predict(&text) {
            Ok(label) => (label, false),
            Err(e) => {
                warn!(error = %e, statement = %p.statement, "classification failed, recording UNKNOWN");
                (Label::Unknown, true)
            }
        }
    }
}

/// Build a table with `annotator`, sequentially.
pub fn build<I>(rows: I, annotator: &Annotator) -> Table
where
    I: IntoIterator<Item = RawRow>,
{
    TableBuilder::new(annotator.clone()).build(rows).table
}

/// A row that passed exclusion but has no prediction yet.
struct Pending {
    statement: String,
    body: String,
    publish_date: Option<NaiveDate>,
    date_unparsed: bool,
    language: String,
    platform: String,
    region: String,
    media_link: String,
    label: String,
}

impl Pending {
    fn into_record(self, ai_prediction: Label) -> Record {
        Record {
            statement: self.statement,
            body: self.body,
            publish_date: self.publish_date,
            language: self.language,
            platform: self.platform,
            region: self.region,
            media_link: self.media_link,
            label: self.label,
            ai_prediction,
        }
    }
}

fn normalize(raw: RawRow) -> Result<Pending, RecordField> {
    let statement = raw.statement.ok_or(RecordField::Statement)?;
    let label = raw.label.ok_or(RecordField::Label)?;

    let publish_date = raw.publish_date.as_deref().and_then(parse_publish_date);
    let date_unparsed = raw.publish_date.is_some() && publish_date.is_none();

    Ok(Pending {
        statement,
        body: raw.body.unwrap_or_default(),
        publish_date,
        date_unparsed,
        language: raw.language.unwrap_or_default(),
        platform: raw.platform.unwrap_or_default(),
        region: raw.region.unwrap_or_default(),
        media_link: raw.media_link.unwrap_or_default(),
        label,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::{build, BuiltTable, SkipReason, TableBuilder};
    use crate::classify::{Annotator, Classifier};
    use crate::error::ClassifierError;
    use crate::execution::{ExecutionEngine, ExecutionOptions};
    use crate::types::{Label, RawRow, RecordField};

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().copied())
    }

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
    }

    impl Classifier for CountingClassifier {
        fn classify(&self, text: &str) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.contains("boom") {
                return Err(ClassifierError::Unavailable("offline".to_string()));
            }
            Ok(if text.contains("fake") { "LABEL_0" } else { "LABEL_1" }.to_string())
        }
    }

    #[test]
    fn rows_missing_statement_or_label_are_excluded() {
        let rows = vec![
            row(&[("Eng_Trans_Statement", "A"), ("Label", "False")]),
            row(&[("Eng_Trans_Statement", "B")]),
            row(&[("Label", "True")]),
            row(&[("Eng_Trans_Statement", "  "), ("Label", "True")]),
        ];
        let built = TableBuilder::default().build(rows);

        assert_eq!(built.table.len(), 1);
        assert_eq!(built.table.records()[0].statement, "A");
        assert_eq!(built.stats.rows_read, 4);
        assert_eq!(built.stats.rows_missing_required, 3);
        assert_eq!(
            built.skipped.iter().map(|s| (s.row, s.reason.clone())).collect::<Vec<_>>(),
            vec![
                (2, SkipReason::MissingRequired(RecordField::Label)),
                (3, SkipReason::MissingRequired(RecordField::Statement)),
                (4, SkipReason::MissingRequired(RecordField::Statement)),
            ]
        );
    }

    #[test]
    fn optional_fields_default_to_empty_and_dates_are_lenient() {
        let rows = vec![
            row(&[
                ("Eng_Trans_Statement", "A"),
                ("Label", "False"),
                ("Publish_Date", "not a date"),
            ]),
            row(&[
                ("Eng_Trans_Statement", "B"),
                ("Label", "True"),
                ("Publish_Date", "2021-06-01"),
                ("Platform", "Twitter"),
            ]),
        ];
        let built = TableBuilder::default().build(rows);
        let records = built.table.records();

        assert_eq!(records[0].body, "");
        assert_eq!(records[0].platform, "");
        assert_eq!(records[0].media_link, "");
        assert_eq!(records[0].publish_date, None);
        assert_eq!(records[1].publish_date, NaiveDate::from_ymd_opt(2021, 6, 1));
        assert_eq!(records[1].platform, "Twitter");
        assert_eq!(built.stats.dates_unparsed, 1);
    }

    #[test]
    fn predictions_are_computed_once_per_record() {
        let model = Arc::new(CountingClassifier::default());
        let annotator = Annotator::new(model.clone());
        let rows = vec![
            row(&[("Eng_Trans_Statement", "a fake claim"), ("Label", "False")]),
            row(&[("Eng_Trans_Statement", "a real claim"), ("Label", "True")]),
            row(&[("Eng_Trans_Statement", "no label")]),
        ];

        let table = build(rows, &annotator);

        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
        assert_eq!(table.records()[0].ai_prediction, Label::Fake);
        assert_eq!(table.records()[1].ai_prediction, Label::Real);
    }

    #[test]
    fn classification_text_joins_statement_and_body() {
        let annotator = Annotator::new(Arc::new(|text: &str| -> Result<String, ClassifierError> {
            Ok(if text == "head body text" { "LABEL_0" } else { "LABEL_1" }.to_string())
        }));
        let table = build(
            vec![row(&[
                ("Eng_Trans_Statement", "head"),
                ("Eng_Trans_News_Body", "body text"),
                ("Label", "False"),
            ])],
            &annotator,
        );
        assert_eq!(table.records()[0].ai_prediction, Label::Fake);
    }

    #[test]
    fn a_failing_prediction_does_not_abort_the_load() {
        let annotator = Annotator::new(Arc::new(CountingClassifier::default()));
        let rows = vec![
            row(&[("Eng_Trans_Statement", "boom"), ("Label", "False")]),
            row(&[("Eng_Trans_Statement", "fake news"), ("Label", "False")]),
        ];
        let built = TableBuilder::new(annotator).build(rows);

        assert_eq!(built.table.len(), 2);
        assert_eq!(built.table.records()[0].ai_prediction, Label::Unknown);
        assert_eq!(built.table.records()[1].ai_prediction, Label::Fake);
        assert_eq!(built.stats.predictions_failed, 1);
    }

    fn panicking_annotator() -> Annotator {
        Annotator::new(Arc::new(|text: &str| -> Result<String, ClassifierError> {
            if text.contains("bad") {
                panic!("model crashed on {text}");
            }
            Ok("LABEL_0".to_string())
        }))
    }

    fn rows_with_one_bad() -> Vec<RawRow> {
        (0..20)
            .map(|i| {
                let statement = if i == 7 { "bad input".to_string() } else { format!("claim {i}") };
                row(&[("Eng_Trans_Statement", statement.as_str()), ("Label", "False")])
            })
            .collect()
    }

    fn assert_only_the_bad_record_is_unknown(built: &BuiltTable) {
        assert_eq!(built.table.len(), 20);
        assert_eq!(built.stats.predictions_failed, 1);
        for (i, record) in built.table.iter().enumerate() {
            let expected = if i == 7 { Label::Unknown } else { Label::Fake };
            assert_eq!(record.ai_prediction, expected, "record {i}");
        }
    }

    #[test]
    fn a_panicking_model_degrades_one_record_sequentially() {
        let built = TableBuilder::new(panicking_annotator()).build(rows_with_one_bad());
        assert_only_the_bad_record_is_unknown(&built);
    }

    #[test]
    fn a_panicking_model_degrades_one_record_on_the_pool() {
        let engine = Arc::new(
            ExecutionEngine::new(ExecutionOptions {
                num_threads: Some(4),
                chunk_size: 3,
                max_in_flight_chunks: 2,
            })
            .unwrap(),
        );
        let built = TableBuilder::new(panicking_annotator())
            .with_engine(engine)
            .build(rows_with_one_bad());
        assert_only_the_bad_record_is_unknown(&built);
    }

    #[test]
    fn parallel_annotation_matches_sequential() {
        let rows: Vec<RawRow> = (0..300)
            .map(|i| {
                let statement = if i % 3 == 0 { format!("fake {i}") } else { format!("story {i}") };
                row(&[("Eng_Trans_Statement", statement.as_str()), ("Label", "True")])
            })
            .collect();
        let annotator = Annotator::new(Arc::new(CountingClassifier::default()));
        let engine = Arc::new(
            ExecutionEngine::new(ExecutionOptions {
                num_threads: Some(4),
                chunk_size: 16,
                max_in_flight_chunks: 4,
            })
            .unwrap(),
        );

        let sequential = TableBuilder::new(annotator.clone()).build(rows.clone());
        let parallel = TableBuilder::new(annotator).with_engine(engine).build(rows);

        assert_eq!(sequential.table, parallel.table);
        assert_eq!(parallel.table.records()[3].ai_prediction, Label::Fake);
        assert_eq!(parallel.table.records()[4].ai_prediction, Label::Real);
    }

    #[test]
    fn without_a_model_every_prediction_is_unknown() {
        let table = build(
            vec![row(&[("Eng_Trans_Statement", "A"), ("Label", "False")])],
            &Annotator::without_model(),
        );
        assert_eq!(table.records()[0].ai_prediction, Label::Unknown);
    }
}
