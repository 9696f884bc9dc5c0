//! Client-side query synthesis
//!
//! The upstream API has no filtering, sorting, or pagination, so the gateway
//! emulates them here over the canonical record set. Pure functions over the
//! data model; the upstream is never consulted.

use crate::record::CanonicalRecord;
use std::cmp::Ordering;

/// Sortable columns, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Record text
    Text,

    /// Creation instant
    CreatedAt,

    /// Originating application
    SourceApp,
}

impl SortColumn {
    /// Parse a column name; accepts the wire aliases the UI layer sends.
    /// Unknown names yield None, which the engine treats as "do not sort".
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" | "memory" => Some(SortColumn::Text),
            "created_at" => Some(SortColumn::CreatedAt),
            "source_app" | "app_name" => Some(SortColumn::SourceApp),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending (default)
    #[default]
    Ascending,

    /// Descending
    Descending,
}

impl SortDirection {
    /// Parse "asc"/"desc"; anything else is ascending
    pub fn parse(name: &str) -> Self {
        match name {
            "desc" => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

/// Filter, sort, and pagination parameters for one query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Keep records whose source_app is in this set; empty = no constraint
    pub apps: Vec<String>,

    /// Keep records sharing at least one category; empty = no constraint
    pub categories: Vec<String>,

    /// Column name to sort on; unknown or absent = preserve input order
    pub sort_column: Option<String>,

    /// Direction applied when sort_column resolves
    pub sort_direction: SortDirection,

    /// 1-based page number; 0 is treated as 1
    pub page: usize,

    /// Page size; None = no pagination, Some(0) is treated as 1
    pub page_size: Option<usize>,
}

/// One delivered page plus totals over the filtered set
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    /// The records on the requested page, in final order
    pub records: Vec<CanonicalRecord>,

    /// Count of records passing the filter, across all pages
    pub total: usize,

    /// Number of pages the filtered set spans
    pub page_count: usize,
}

impl QueryPage {
    /// A page with no records and zero totals
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            page_count: 0,
        }
    }
}

/// Apply filter, stable sort, and pagination over a canonical sequence
pub fn run_query(records: &[CanonicalRecord], opts: &QueryOptions) -> QueryPage {
    let mut filtered: Vec<CanonicalRecord> = records
        .iter()
        .filter(|r| passes_filter(r, opts))
        .cloned()
        .collect();

    if let Some(column) = opts.sort_column.as_deref().and_then(SortColumn::parse) {
        sort_records(&mut filtered, column, opts.sort_direction);
    }

    let total = filtered.len();
    match opts.page_size {
        None => {
            let page_count = usize::from(total > 0);
            QueryPage {
                records: filtered,
                total,
                page_count,
            }
        }
        Some(size) => {
            let size = size.max(1);
            let page = opts.page.max(1);
            let page_count = total.div_ceil(size);
            let start = (page - 1).saturating_mul(size).min(total);
            let end = (start + size).min(total);
            QueryPage {
                records: filtered[start..end].to_vec(),
                total,
                page_count,
            }
        }
    }
}

/// Filters are conjunctive; an empty requested set places no constraint on
/// that dimension.
fn passes_filter(record: &CanonicalRecord, opts: &QueryOptions) -> bool {
    if !opts.apps.is_empty() && !opts.apps.iter().any(|app| *app == record.source_app) {
        return false;
    }
    if !opts.categories.is_empty()
        && !opts
            .categories
            .iter()
            .any(|c| record.categories.contains(c))
    {
        return false;
    }
    true
}

fn sort_records(records: &mut [CanonicalRecord], column: SortColumn, direction: SortDirection) {
    // sort_by is stable; reversing the ordering of unequal keys keeps equal
    // keys in insertion order for both directions
    records.sort_by(|a, b| {
        let ord = match column {
            SortColumn::Text => a.text.cmp(&b.text),
            SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
            SortColumn::SourceApp => a.source_app.cmp(&b.source_app),
        };
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MemoryState;
    use std::collections::BTreeSet;

    fn record(id: &str, text: &str, created_at: i64, app: &str) -> CanonicalRecord {
        CanonicalRecord {
            id: id.to_string(),
            text: text.to_string(),
            created_at,
            state: MemoryState::Active,
            metadata: serde_json::Map::new(),
            categories: BTreeSet::new(),
            source_app: app.to_string(),
        }
    }

    fn sample() -> Vec<CanonicalRecord> {
        vec![
            record("1", "bravo", 200, "alpha-app"),
            record("2", "alpha", 100, "beta-app"),
            record("3", "charlie", 300, "alpha-app"),
        ]
    }

    fn ids(page: &QueryPage) -> Vec<&str> {
        page.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_no_constraints_is_identity() {
        let records = sample();
        let page = run_query(&records, &QueryOptions::default());
        assert_eq!(page.records, records);
        assert_eq!(page.total, 3);
        assert_eq!(page.page_count, 1);
    }

    #[test]
    fn test_app_filter() {
        let records = sample();
        let opts = QueryOptions {
            apps: vec!["alpha-app".to_string()],
            ..Default::default()
        };
        let page = run_query(&records, &opts);
        assert_eq!(ids(&page), vec!["1", "3"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_empty_filter_set_means_no_constraint() {
        let records = sample();
        let opts = QueryOptions {
            apps: Vec::new(),
            categories: Vec::new(),
            ..Default::default()
        };
        assert_eq!(run_query(&records, &opts).total, 3);
    }

    #[test]
    fn test_category_filter_intersects() {
        let mut records = sample();
        records[0].categories.insert("work".to_string());
        records[1].categories.insert("home".to_string());
        let opts = QueryOptions {
            categories: vec!["work".to_string(), "travel".to_string()],
            ..Default::default()
        };
        let page = run_query(&records, &opts);
        assert_eq!(ids(&page), vec!["1"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let mut records = sample();
        records[0].categories.insert("work".to_string());
        records[1].categories.insert("work".to_string());
        let opts = QueryOptions {
            apps: vec!["beta-app".to_string()],
            categories: vec!["work".to_string()],
            ..Default::default()
        };
        // Record 1 matches the category but not the app; record 2 matches both
        let page = run_query(&records, &opts);
        assert_eq!(ids(&page), vec!["2"]);
    }

    #[test]
    fn test_sort_by_text() {
        let records = sample();
        let opts = QueryOptions {
            sort_column: Some("text".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&records, &opts)), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_sort_descending() {
        let records = sample();
        let opts = QueryOptions {
            sort_column: Some("created_at".to_string()),
            sort_direction: SortDirection::Descending,
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&records, &opts)), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_sort_accepts_wire_aliases() {
        let records = sample();
        let opts = QueryOptions {
            sort_column: Some("memory".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&records, &opts)), vec!["2", "1", "3"]);

        let opts = QueryOptions {
            sort_column: Some("app_name".to_string()),
            ..Default::default()
        };
        assert_eq!(run_query(&records, &opts).records[0].source_app, "alpha-app");
    }

    #[test]
    fn test_unknown_sort_column_preserves_order() {
        let records = sample();
        let opts = QueryOptions {
            sort_column: Some("score".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&records, &opts)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_sort_stability_on_equal_keys() {
        let records = vec![
            record("first", "same", 500, "app"),
            record("second", "same", 500, "app"),
            record("third", "other", 100, "app"),
        ];
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let opts = QueryOptions {
                sort_column: Some("created_at".to_string()),
                sort_direction: direction,
                ..Default::default()
            };
            let page = run_query(&records, &opts);
            let pos_first = page.records.iter().position(|r| r.id == "first").unwrap();
            let pos_second = page.records.iter().position(|r| r.id == "second").unwrap();
            assert!(
                pos_first < pos_second,
                "equal keys must keep insertion order ({:?})",
                direction
            );
        }
    }

    #[test]
    fn test_pagination_totals() {
        let records: Vec<CanonicalRecord> = (0..23)
            .map(|i| record(&format!("r{}", i), "text", i, "app"))
            .collect();
        let opts = QueryOptions {
            page: 3,
            page_size: Some(10),
            ..Default::default()
        };
        let page = run_query(&records, &opts);
        assert_eq!(page.total, 23);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.records.len(), 3);

        let opts = QueryOptions {
            page: 4,
            page_size: Some(10),
            ..Default::default()
        };
        let page = run_query(&records, &opts);
        assert!(page.records.is_empty());
        assert_eq!(page.total, 23);
    }

    #[test]
    fn test_page_slice_contents() {
        let records: Vec<CanonicalRecord> = (0..5)
            .map(|i| record(&format!("r{}", i), "text", i, "app"))
            .collect();
        let opts = QueryOptions {
            page: 2,
            page_size: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(&run_query(&records, &opts)), vec!["r2", "r3"]);
    }

    #[test]
    fn test_zero_page_params_clamped() {
        let records = sample();
        let opts = QueryOptions {
            page: 0,
            page_size: Some(0),
            ..Default::default()
        };
        let page = run_query(&records, &opts);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.page_count, 3);
    }

    #[test]
    fn test_empty_input() {
        let page = run_query(&[], &QueryOptions::default());
        assert_eq!(page, QueryPage::empty());
    }
}
