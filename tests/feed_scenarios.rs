use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;

use newsfeed_engine::classify::{Annotator, Classifier};
use newsfeed_engine::config::FeedConfig;
use newsfeed_engine::feed::{Feed, PostsRequest};
use newsfeed_engine::ingestion::build;
use newsfeed_engine::processing::{count_by, distinct_values, query, CountField, MultiValueField, PageRequest, QueryFilters};
use newsfeed_engine::types::{Label, RawRow};
use newsfeed_engine::ClassifierError;

fn row(statement: &str, label: &str, platform: &str) -> RawRow {
    RawRow::from_pairs([
        ("Eng_Trans_Statement", statement),
        ("Label", label),
        ("Platform", platform),
    ])
}

fn two_record_rows() -> Vec<RawRow> {
    vec![row("A", "False", "Twitter,Facebook"), row("B", "True", "whatsapp")]
}

/// Flags posts that promise something free or claim a cure.
fn keyword_classifier(calls: Arc<AtomicUsize>) -> Arc<dyn Classifier> {
    Arc::new(move |text: &str| -> Result<String, ClassifierError> {
        calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        if lower.contains("free") || lower.contains("cures") {
            Ok("LABEL_0".to_string())
        } else {
            Ok("LABEL_1".to_string())
        }
    })
}

fn fixture_config() -> FeedConfig {
    FeedConfig::from_toml_str(
        r#"
        [dataset]
        path = "tests/fixtures/news.csv"
        encoding = "utf-8"

        [query]
        default_limit = 2

        [execution]
        num_threads = 2
        chunk_size = 1
        max_in_flight_chunks = 2
        "#,
    )
    .unwrap()
}

#[test]
fn distinct_platforms_are_split_trimmed_and_title_cased() {
    let table = build(two_record_rows(), &Annotator::without_model());
    assert_eq!(
        distinct_values(&table, MultiValueField::Platform),
        vec!["Facebook", "Twitter", "Whatsapp"]
    );
}

#[test]
fn label_filter_is_case_insensitive_exact() {
    let table = build(two_record_rows(), &Annotator::without_model());
    let filters = QueryFilters {
        label: Some("false".to_string()),
        ..Default::default()
    };

    let hits = query(&table, &filters, PageRequest::default());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].statement, "A");
}

#[test]
fn count_by_label_counts_raw_values() {
    let table = build(two_record_rows(), &Annotator::without_model());
    let expected: BTreeMap<String, usize> = [("False".to_string(), 1), ("True".to_string(), 1)].into();
    assert_eq!(count_by(&table, CountField::Label), expected);
}

#[test]
fn empty_text_is_unknown_without_calling_the_model() {
    let calls = Arc::new(AtomicUsize::new(0));
    let annotator = Annotator::new(keyword_classifier(calls.clone()));

    assert_eq!(annotator.predict(""), Label::Unknown);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn page_past_the_end_is_empty() {
    let table = build(two_record_rows(), &Annotator::without_model());
    assert!(query(&table, &QueryFilters::default(), PageRequest::new(5, 10)).is_empty());
}

#[test]
fn feed_load_builds_the_fixture_table() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (feed, stats) = Feed::load(&fixture_config(), Some(keyword_classifier(calls.clone()))).unwrap();

    assert_eq!(stats.records, 4);
    assert_eq!(stats.rows_read, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    let table = feed.snapshot();
    for record in table.iter() {
        assert!(!record.statement.is_empty());
        assert!(!record.label.is_empty());
    }
    let dates: Vec<Option<NaiveDate>> = table.iter().map(|r| r.publish_date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2021, 3, 15),
            NaiveDate::from_ymd_opt(2021, 3, 1),
            None,
            NaiveDate::from_ymd_opt(2021, 3, 14),
        ]
    );
    let predictions: Vec<Label> = table.iter().map(|r| r.ai_prediction).collect();
    assert_eq!(predictions, vec![Label::Fake, Label::Real, Label::Fake, Label::Real]);
}

#[test]
fn feed_operations_over_the_fixture() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (feed, _) = Feed::load(&fixture_config(), Some(keyword_classifier(calls.clone()))).unwrap();

    // Configured default page size is 2.
    let first = feed.posts(&PostsRequest::default());
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].date, "2021-03-15");
    assert_eq!(first[0].image, "http://img/1.jpg");

    let second = feed.posts(&PostsRequest {
        page: Some("2".to_string()),
        ..Default::default()
    });
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].date, "");
    assert_eq!(second[1].title, "Election results announced");

    let facebook = feed.posts(&PostsRequest {
        filters: QueryFilters {
            platform: Some("FACEBOOK".to_string()),
            ..Default::default()
        },
        limit: Some("10".to_string()),
        ..Default::default()
    });
    assert_eq!(facebook.len(), 2);

    let india = feed.posts(&PostsRequest {
        filters: QueryFilters {
            region: Some("india".to_string()),
            search: Some("DRIVE".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    assert_eq!(india.len(), 1);
    assert_eq!(india[0].label, "True");

    let trends = feed.trends();
    assert_eq!(trends.dataset_labels.get("False"), Some(&2));
    assert_eq!(trends.dataset_labels.get("True"), Some(&1));
    assert_eq!(trends.dataset_labels.get("TRUE"), Some(&1));

    let ai = feed.ai_trends();
    assert_eq!(ai.ai_prediction_counts.get("FAKE"), Some(&2));
    assert_eq!(ai.ai_prediction_counts.get("REAL"), Some(&2));

    let filters = feed.filters();
    assert_eq!(filters.platforms, vec!["Facebook", "Twitter", "Whatsapp", "Youtube"]);
    assert_eq!(filters.regions, vec!["Delhi", "India", "Kerala", "Tamil Nadu"]);
    assert_eq!(filters.languages, vec!["English", "Hindi", "Tamil"]);

    // Predictions are computed once at load, never per query.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn without_a_model_every_prediction_is_unknown() {
    let (feed, _) = Feed::load(&fixture_config(), None).unwrap();
    let ai = feed.ai_trends();
    assert_eq!(ai.ai_prediction_counts.len(), 1);
    assert_eq!(ai.ai_prediction_counts.get("UNKNOWN"), Some(&4));
}

#[test]
fn missing_dataset_fails_the_load() {
    let config = FeedConfig::from_toml_str("[dataset]\npath = \"tests/fixtures/nope.csv\"\n").unwrap();
    assert!(Feed::load(&config, None).is_err());
}
