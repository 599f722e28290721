use std::collections::BTreeSet;

use serde::Deserialize;

use crate::data::filter::FilterState;
use crate::data::model::{CellValue, Dataset};
use crate::data::view::{SortKey, TableQuery};

/// Query string sent by the filter form and the table script.
///
/// ```text
/// ?title=deep&authors=smith&year=2020&year=2021&category=ML
///  &page=1&sort=year:desc&sort=title&filter=citations=>10
/// ```
///
/// Everything is taken as text and interpreted leniently: a value that
/// does not make sense turns into "no constraint" or simply matches nothing.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub page: Option<String>,
    /// `column`, `column:asc` or `column:desc`, most significant first.
    #[serde(default)]
    pub sort: Vec<String>,
    /// `column=expression`, split at the first `=`.
    #[serde(default)]
    pub filter: Vec<String>,
}

impl DashboardParams {
    /// Dropdown selections are resolved against the dataset's option lists,
    /// so they keep the exact values the options were rendered from.
    pub fn filter_state(&self, dataset: &Dataset) -> FilterState {
        FilterState {
            search_title: non_empty(&self.title),
            search_authors: non_empty(&self.authors),
            years: selection(&self.year, dataset.year_options()),
            categories: selection(&self.category, dataset.category_options()),
        }
    }

    pub fn table_query(&self) -> TableQuery {
        TableQuery {
            page: self
                .page
                .as_deref()
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(0),
            sort_by: self.sort.iter().filter_map(|s| parse_sort(s)).collect(),
            column_filters: self
                .filter
                .iter()
                .filter_map(|f| f.split_once('='))
                .map(|(column, expression)| (column.to_string(), expression.to_string()))
                .collect(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Every option whose text equals a submitted value. A value no option
/// renders to stays as text and matches nothing.
fn selection(values: &[String], options: &[CellValue]) -> BTreeSet<CellValue> {
    let mut selected = BTreeSet::new();
    for value in values.iter().filter(|v| !v.is_empty()) {
        let before = selected.len();
        selected.extend(options.iter().filter(|o| o.to_string() == *value).cloned());
        if selected.len() == before {
            selected.insert(CellValue::String(value.clone()));
        }
    }
    selected
}

fn parse_sort(token: &str) -> Option<SortKey> {
    if token.is_empty() {
        return None;
    }
    let key = match token.rsplit_once(':') {
        Some((column, "desc")) => SortKey::desc(column),
        Some((column, "asc")) => SortKey::asc(column),
        _ => SortKey::asc(token),
    };
    Some(key)
}
