use std::collections::BTreeSet;

use super::model::{CellValue, Dataset, Record, AUTHORS, CATEGORY, TITLE, YEAR};

// ---------------------------------------------------------------------------
// Filter predicate: the four top-level controls
// ---------------------------------------------------------------------------

/// Current values of the search and dropdown controls.
///
/// An absent or empty value means "no constraint on this axis". The four
/// constraints are combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_title: Option<String>,
    pub search_authors: Option<String>,
    pub years: BTreeSet<CellValue>,
    pub categories: BTreeSet<CellValue>,
}

impl FilterState {
    pub fn with_title(mut self, term: &str) -> Self {
        self.search_title = Some(term.to_string());
        self
    }

    pub fn with_authors(mut self, term: &str) -> Self {
        self.search_authors = Some(term.to_string());
        self
    }

    pub fn with_years<I, V>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, V>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Whether no control constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        search_term(&self.search_title).is_none()
            && search_term(&self.search_authors).is_none()
            && self.years.is_empty()
            && self.categories.is_empty()
    }

    /// Whether `record` passes every active constraint.
    pub fn matches(&self, record: &Record) -> bool {
        let needle_title = search_term(&self.search_title);
        let needle_authors = search_term(&self.search_authors);
        self.matches_with(record, needle_title.as_deref(), needle_authors.as_deref())
    }

    fn matches_with(
        &self,
        record: &Record,
        title: Option<&str>,
        authors: Option<&str>,
    ) -> bool {
        if let Some(needle) = title {
            if !contains_ignore_case(record.get(TITLE), needle) {
                return false;
            }
        }
        if let Some(needle) = authors {
            if !contains_ignore_case(record.get(AUTHORS), needle) {
                return false;
            }
        }
        if !self.years.is_empty() && !self.years.contains(record.get(YEAR)) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(record.get(CATEGORY)) {
            return false;
        }
        true
    }
}

/// Lower-cased search term, `None` when the control is absent or empty.
fn search_term(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Literal, case-insensitive substring test. Null cells never match.
fn contains_ignore_case(value: &CellValue, lowered_needle: &str) -> bool {
    match value {
        CellValue::Null => false,
        CellValue::String(s) => s.to_lowercase().contains(lowered_needle),
        other => other.to_string().to_lowercase().contains(lowered_needle),
    }
}

/// Return indices of papers that pass all active filters, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    if filters.is_unconstrained() {
        return (0..dataset.len()).collect();
    }

    let title = search_term(&filters.search_title);
    let authors = search_term(&filters.search_authors);

    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| filters.matches_with(record, title.as_deref(), authors.as_deref()))
        .map(|(i, _)| i)
        .collect()
}
