//! Property tests for table building and the read operations.

use newsfeed_engine::classify::Annotator;
use newsfeed_engine::ingestion::build;
use newsfeed_engine::processing::{
    count_by, count_matching, distinct_values, matching, query, title_case, CountField, MultiValueField, PageRequest,
    QueryFilters,
};
use newsfeed_engine::types::{RawRow, Record, Table};
use proptest::collection::vec;
use proptest::prelude::*;

fn raw_row() -> impl Strategy<Value = RawRow> {
    (
        "[A-Za-z ]{0,12}",
        "[a-z ]{0,20}",
        prop::sample::select(vec!["", " ", "False", "True", "TRUE", "misleading"]),
        "[A-Za-z, ]{0,16}",
        "[A-Za-z, ]{0,16}",
        "[A-Za-z, ]{0,12}",
    )
        .prop_map(|(statement, body, label, platform, region, language)| {
            RawRow::from_pairs([
                ("Eng_Trans_Statement", statement.as_str()),
                ("Eng_Trans_News_Body", body.as_str()),
                ("Label", label),
                ("Platform", platform.as_str()),
                ("Region", region.as_str()),
                ("Language", language.as_str()),
            ])
        })
}

fn filters() -> impl Strategy<Value = QueryFilters> {
    (
        prop::option::of("[a-zA-Z]{0,3}"),
        prop::option::of("[a-zA-Z]{0,3}"),
        prop::option::of(prop::sample::select(vec!["false", "true", "x"])),
        prop::option::of("[a-z]{0,2}"),
    )
        .prop_map(|(platform, region, label, search)| QueryFilters {
            platform,
            region,
            label: label.map(str::to_string),
            search,
        })
}

fn table_from(rows: Vec<RawRow>) -> Table {
    build(rows, &Annotator::without_model())
}

proptest! {
    /// Built records always carry a statement and a label; nothing else is dropped.
    #[test]
    fn build_keeps_exactly_the_rows_with_statement_and_label(rows in vec(raw_row(), 0..40)) {
        let expected = rows
            .iter()
            .filter(|r| r.statement.is_some() && r.label.is_some())
            .count();
        let table = table_from(rows);

        prop_assert_eq!(table.len(), expected);
        for record in &table {
            prop_assert!(!record.statement.trim().is_empty());
            prop_assert!(!record.label.trim().is_empty());
        }
    }

    /// Walking every page in order yields the full filtered result, once each.
    #[test]
    fn pages_reassemble_the_filtered_result(
        rows in vec(raw_row(), 0..40),
        f in filters(),
        limit in 1i64..7,
    ) {
        let table = table_from(rows);
        let all: Vec<&Record> = matching(&table, &f).collect();
        prop_assert_eq!(all.len(), count_matching(&table, &f));

        let mut paged = Vec::new();
        let mut page = 1;
        loop {
            let chunk = query(&table, &f, PageRequest::new(page, limit));
            if chunk.is_empty() {
                break;
            }
            prop_assert!(chunk.len() <= limit as usize);
            paged.extend(chunk);
            page += 1;
        }
        prop_assert_eq!(paged, all);
    }

    /// Filtering an already-filtered table changes nothing.
    #[test]
    fn filtering_is_idempotent(rows in vec(raw_row(), 0..40), f in filters()) {
        let table = table_from(rows);
        let once: Vec<Record> = matching(&table, &f).cloned().collect();
        let again = Table::new(once.clone());
        let twice: Vec<Record> = matching(&again, &f).cloned().collect();

        prop_assert_eq!(once, twice);
    }

    /// Category counts always sum to the table size.
    #[test]
    fn counts_cover_every_record(rows in vec(raw_row(), 0..40)) {
        let table = table_from(rows);
        for field in [CountField::Label, CountField::Platform, CountField::Region, CountField::AiPrediction] {
            let total: usize = count_by(&table, field).values().sum();
            prop_assert_eq!(total, table.len());
        }
    }

    /// Distinct values are sorted, unique, trimmed, non-empty and already title-cased.
    #[test]
    fn distinct_values_are_normalized(rows in vec(raw_row(), 0..40)) {
        let table = table_from(rows);
        for field in [MultiValueField::Platform, MultiValueField::Region, MultiValueField::Language] {
            let values = distinct_values(&table, field);
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
            for v in &values {
                prop_assert!(!v.is_empty());
                prop_assert_eq!(v.trim(), v.as_str());
                prop_assert_eq!(&title_case(v), v);
            }
            prop_assert_eq!(distinct_values(&table, field), values);
        }
    }

    #[test]
    fn title_case_is_idempotent(s in "[a-zA-Z0-9 '.-]{0,24}") {
        let once = title_case(&s);
        prop_assert_eq!(title_case(&once), once);
    }
}
