//! Filtering and pagination over a [`Table`].

use serde::Deserialize;

use crate::types::{Record, Table};

/// Default page size.
pub const DEFAULT_LIMIT: usize = 10;

/// Filter options for [`query`]. Options are combined with logical AND; an absent or empty
/// option matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    /// Case-insensitive substring of the raw platform field.
    pub platform: Option<String>,
    /// Case-insensitive substring of the raw region field.
    pub region: Option<String>,
    /// Case-insensitive exact match against the ground-truth label.
    pub label: Option<String>,
    /// Case-insensitive substring of the statement or the body.
    pub search: Option<String>,
}

impl QueryFilters {
    /// Lower-cased, non-empty needles, computed once per query.
    fn compile(&self) -> CompiledFilters {
        fn needle(opt: &Option<String>) -> Option<String> {
            opt.as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
        }
        CompiledFilters {
            platform: needle(&self.platform),
            region: needle(&self.region),
            label: needle(&self.label),
            search: needle(&self.search),
        }
    }

    /// Whether `record` passes every set option.
    pub fn matches(&self, record: &Record) -> bool {
        self.compile().matches(record)
    }
}

struct CompiledFilters {
    platform: Option<String>,
    region: Option<String>,
    label: Option<String>,
    search: Option<String>,
}

impl CompiledFilters {
    fn matches(&self, record: &Record) -> bool {
        contains_ci(&record.platform, self.platform.as_deref())
            && contains_ci(&record.region, self.region.as_deref())
            && self
                .label
                .as_deref()
                .is_none_or(|l| record.label.to_lowercase() == l)
            && self.search.as_deref().is_none_or(|s| {
                record.statement.to_lowercase().contains(s) || record.body.to_lowercase().contains(s)
            })
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|n| haystack.to_lowercase().contains(n))
}

/// A 1-indexed page window.
///
/// Values below 1 are clamped to 1 on construction, so a `PageRequest` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Create a window, clamping `page` and `limit` to a minimum of 1.
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: clamp_to_usize(page),
            limit: clamp_to_usize(limit),
        }
    }

    /// Parse raw query-string values.
    ///
    /// A missing or non-numeric `page` is 1 and a missing or non-numeric `limit` is
    /// `default_limit`; numeric values below 1 clamp to 1. `max_limit`, when set, caps `limit`.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: usize,
        max_limit: Option<usize>,
    ) -> Self {
        let page = parse_param(page).map(clamp_to_usize).unwrap_or(1);
        let limit = parse_param(limit)
            .map(clamp_to_usize)
            .unwrap_or_else(|| default_limit.max(1));
        let limit = max_limit.map_or(limit, |max| limit.min(max.max(1)));
        Self { page, limit }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Index of the first item in the window.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
}

fn clamp_to_usize(v: i64) -> usize {
    usize::try_from(v.max(1)).unwrap_or(usize::MAX)
}

/// Records matching `filters`, in table order.
pub fn matching<'a>(table: &'a Table, filters: &QueryFilters) -> impl Iterator<Item = &'a Record> + use<'a> {
    let compiled = filters.compile();
    table.iter().filter(move |r| compiled.matches(r))
}

/// Records matching `filters` within the `page` window, in table order.
///
/// A window past the end of the matches is empty, not an error.
pub fn query<'a>(table: &'a Table, filters: &QueryFilters, page: PageRequest) -> Vec<&'a Record> {
    matching(table, filters)
        .skip(page.offset())
        .take(page.limit())
        .collect()
}

/// Number of records matching `filters`.
pub fn count_matching(table: &Table, filters: &QueryFilters) -> usize {
    matching(table, filters).count()
}
