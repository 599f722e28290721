use serde::Serialize;

use super::column_filter::ColumnFilter;
use super::filter::{FilterState, filtered_indices};
use super::model::{CellValue, Dataset};

/// Rows per table page.
pub const PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Table interaction state: sort, header filters, current page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }
}

/// Table-widget state layered on top of the [`FilterState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// 0-based page index; clamped into range when rendering.
    pub page: usize,
    /// Sort keys, most significant first.
    pub sort_by: Vec<SortKey>,
    /// `(column, expression)` pairs typed into the header filter row.
    pub column_filters: Vec<(String, String)>,
}

/// Header filter as reported back to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFilterState {
    pub column: String,
    pub expression: String,
    /// False when the expression did not parse or names an unknown column;
    /// such filters are ignored.
    pub valid: bool,
}

// ---------------------------------------------------------------------------
// TableView – one rendered page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    /// Position of the row in the dataset.
    pub index: usize,
    /// Cells in column order.
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<ViewRow>,
    /// Rows matching every filter, across all pages.
    pub total_rows: usize,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub sort_by: Vec<SortKey>,
    pub column_filters: Vec<ColumnFilterState>,
}

/// Number of pages needed for `rows` rows. Zero rows still need one page.
pub fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size).max(1)
}

/// Produce the page of the table the user is looking at.
///
/// Pipeline: top-level filters → header filters → stable sort → paginate.
/// Pure: the same inputs always yield the same view.
pub fn render(dataset: &Dataset, filters: &FilterState, query: &TableQuery) -> TableView {
    let mut indices = filtered_indices(dataset, filters);

    let mut column_filters = Vec::with_capacity(query.column_filters.len());
    let mut active = Vec::new();
    for (column, expression) in &query.column_filters {
        if expression.trim().is_empty() {
            continue;
        }
        let parsed = ColumnFilter::parse(column, expression).filter(|_| dataset.has_column(column));
        column_filters.push(ColumnFilterState {
            column: column.clone(),
            expression: expression.clone(),
            valid: parsed.is_some(),
        });
        match parsed {
            Some(filter) => active.push(filter),
            None => log::debug!("Ignoring filter {expression:?} on column {column:?}"),
        }
    }
    let records = dataset.records();
    if !active.is_empty() {
        indices.retain(|&i| active.iter().all(|f| f.matches(&records[i])));
    }

    let sort_by: Vec<SortKey> = query
        .sort_by
        .iter()
        .filter(|key| dataset.has_column(&key.column))
        .cloned()
        .collect();
    if !sort_by.is_empty() {
        // `sort_by` is stable, so ties keep dataset order.
        indices.sort_by(|&a, &b| {
            for key in &sort_by {
                let ord = records[a].get(&key.column).cmp(records[b].get(&key.column));
                let ord = if key.descending { ord.reverse() } else { ord };
                if ord.is_ne() {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    let total_rows = indices.len();
    let page_count = page_count(total_rows, PAGE_SIZE);
    let page = query.page.min(page_count - 1);

    let columns = dataset.columns().to_vec();
    let rows = indices
        .iter()
        .skip(page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|&index| ViewRow {
            index,
            cells: columns
                .iter()
                .map(|c| records[index].get(c).clone())
                .collect(),
        })
        .collect();

    TableView {
        columns,
        rows,
        total_rows,
        page,
        page_count,
        page_size: PAGE_SIZE,
        sort_by,
        column_filters,
    }
}
