use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::loader::LoadError;

/// Columns every paper table must carry.
pub const TITLE: &str = "title";
pub const AUTHORS: &str = "authors";
pub const YEAR: &str = "year";
pub const CATEGORY: &str = "category";

pub const REQUIRED_COLUMNS: [&str; 4] = [TITLE, AUTHORS, YEAR, CATEGORY];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the paper table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Used in `BTreeSet`s and as a sort key, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats keep a decimal so they read differently from integers.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Integer(i as i64)
    }
}

impl CellValue {
    /// Guess the type of a raw text cell.
    ///
    /// Dropdown values coming back from the browser go through the same
    /// guess as loaded cells, so set membership compares like with like.
    pub fn parse(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Interpret the value as an `f64` for numeric comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single paper (one row of the source table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Dynamic columns: column_name → value.
    pub values: BTreeMap<String, CellValue>,
}

static NULL: CellValue = CellValue::Null;

impl Record {
    pub fn new(values: BTreeMap<String, CellValue>) -> Self {
        Self { values }
    }

    /// Value of `column`, `Null` when the row does not carry it.
    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with the dropdown options precomputed.
///
/// There is no mutation API: a `Dataset` is built once at startup and then
/// shared read-only.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    /// Column names in file order.
    columns: Vec<String>,
    /// Distinct `year` values, ascending.
    years: Vec<CellValue>,
    /// Distinct `category` values in first-seen order.
    categories: Vec<CellValue>,
}

impl Dataset {
    /// Build the dataset and its option lists from loaded rows.
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Result<Self, LoadError> {
        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(LoadError::MissingColumn(required.to_string()));
            }
        }

        let years: BTreeSet<CellValue> = records
            .iter()
            .map(|r| r.get(YEAR))
            .filter(|v| !v.is_null())
            .cloned()
            .collect();

        let mut seen = BTreeSet::new();
        let mut categories = Vec::new();
        for value in records.iter().map(|r| r.get(CATEGORY)) {
            if !value.is_null() && seen.insert(value) {
                categories.push(value.clone());
            }
        }

        Ok(Dataset {
            years: years.into_iter().collect(),
            categories,
            records,
            columns,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn year_options(&self) -> &[CellValue] {
        &self.years
    }

    pub fn category_options(&self) -> &[CellValue] {
        &self.categories
    }

    /// Number of papers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
