use std::cmp::Ordering;

use super::model::{CellValue, Record};

// ---------------------------------------------------------------------------
// Per-column filter expressions typed into the table header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    DateStartsWith,
}

const SYMBOL_OPERATORS: [(&str, Operator); 6] = [
    ("!=", Operator::Ne),
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("=", Operator::Eq),
    ("<", Operator::Lt),
    (">", Operator::Gt),
];

const WORD_OPERATORS: [(&str, Operator); 8] = [
    ("eq", Operator::Eq),
    ("ne", Operator::Ne),
    ("lt", Operator::Lt),
    ("le", Operator::Le),
    ("gt", Operator::Gt),
    ("ge", Operator::Ge),
    ("contains", Operator::Contains),
    ("datestartswith", Operator::DateStartsWith),
];

/// One parsed header filter, e.g. `>= 2020` on `year` or `graph` on `title`.
///
/// Without an explicit operator a numeric operand means `=` and anything
/// else means `contains`. `contains` is case-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub operator: Operator,
    pub operand: CellValue,
}

impl ColumnFilter {
    /// Parse `expression` for `column`. Returns `None` for a blank or
    /// malformed expression.
    pub fn parse(column: &str, expression: &str) -> Option<Self> {
        let rest = expression.trim();
        if rest.is_empty() {
            return None;
        }

        let (operator, rest) = match split_operator(rest) {
            Some((op, rest)) => (Some(op), rest.trim_start()),
            None => (None, rest),
        };

        let operand = parse_operand(rest)?;
        let operator = operator.unwrap_or(match operand {
            CellValue::Integer(_) | CellValue::Float(_) => Operator::Eq,
            _ => Operator::Contains,
        });

        Some(ColumnFilter {
            column: column.to_string(),
            operator,
            operand,
        })
    }

    pub fn matches(&self, record: &Record) -> bool {
        let cell = record.get(&self.column);
        if cell.is_null() {
            return false;
        }
        match self.operator {
            Operator::Contains => cell.to_string().contains(&self.operand.to_string()),
            Operator::DateStartsWith => cell.to_string().starts_with(&self.operand.to_string()),
            Operator::Eq => compare(cell, &self.operand) == Some(Ordering::Equal),
            Operator::Ne => compare(cell, &self.operand).is_some_and(Ordering::is_ne),
            Operator::Lt => compare(cell, &self.operand) == Some(Ordering::Less),
            Operator::Le => matches!(
                compare(cell, &self.operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => compare(cell, &self.operand) == Some(Ordering::Greater),
            Operator::Ge => matches!(
                compare(cell, &self.operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

fn split_operator(input: &str) -> Option<(Operator, &str)> {
    for (symbol, op) in SYMBOL_OPERATORS {
        if let Some(rest) = input.strip_prefix(symbol) {
            return Some((op, rest));
        }
    }
    // Word operators need a separator, so `equation` stays an operand.
    let (word, rest) = input.split_once(char::is_whitespace)?;
    let word = word.to_ascii_lowercase();
    WORD_OPERATORS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, op)| (*op, rest))
}

fn parse_operand(input: &str) -> Option<CellValue> {
    let input = input.trim();
    let mut chars = input.chars();
    match chars.next()? {
        quote @ ('"' | '\'' | '`') => {
            let inner = input[1..].strip_suffix(quote)?;
            Some(CellValue::String(inner.to_string()))
        }
        _ => Some(CellValue::parse(input)),
    }
}

/// Order two cells when their types are comparable: number with number,
/// text with text, bool with bool.
fn compare(cell: &CellValue, operand: &CellValue) -> Option<Ordering> {
    match (cell, operand) {
        (CellValue::String(a), CellValue::String(b)) => Some(a.cmp(b)),
        (CellValue::Bool(a), CellValue::Bool(b)) => Some(a.cmp(b)),
        (CellValue::Integer(a), CellValue::Integer(b)) => Some(a.cmp(b)),
        _ => cell.as_f64()?.partial_cmp(&operand.as_f64()?),
    }
}
