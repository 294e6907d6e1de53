use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use super::Column;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn new(column: impl Into<String>, descending: bool) -> Self {
        Self {
            column: column.into(),
            descending,
        }
    }

    /// Parse `"column"`, `"column asc"` or `"column desc"`
    pub fn parse(s: &str) -> Option<Self> {
        let mut it = s.split_whitespace();
        let column = it.next()?;
        let descending = it.next().is_some_and(|d| d.eq_ignore_ascii_case("desc"));
        Some(Self::new(column, descending))
    }
}

/// One page of a sorted table
#[derive(Debug)]
pub struct PageSlice<'a, T> {
    pub rows: Vec<&'a T>,
    /// Zero-based, clamped to the last page
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
}

/// Client-side sort and pagination over loaded rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn sort_by(&mut self, column: impl Into<String>, descending: bool) {
        self.sort = Some(SortSpec::new(column, descending));
        self.page = 0;
    }

    /// Always at least one page, even for an empty table
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn apply<'a, T: Serialize>(&self, rows: &'a [T]) -> PageSlice<'a, T> {
        let mut order: Vec<usize> = (0..rows.len()).collect();

        if let Some(sort) = &self.sort {
            let keys: Vec<Value> = rows
                .iter()
                .map(|r| {
                    serde_json::to_value(r)
                        .map(|v| lookup(&v, &sort.column).clone())
                        .unwrap_or(Value::Null)
                })
                .collect();
            order.sort_by(|&a, &b| compare_cells(&keys[a], &keys[b], sort.descending));
        }

        let total = rows.len();
        let page_count = self.page_count(total);
        let page = self.page.min(page_count - 1);
        let rows = order
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .map(|i| &rows[i])
            .collect();

        PageSlice {
            rows,
            page,
            page_count,
            total,
        }
    }
}

/// Follow a dotted path such as `category.name`; missing segments are null
pub fn lookup<'v>(value: &'v Value, path: &str) -> &'v Value {
    path.split('.')
        .try_fold(value, |v, key| v.get(key))
        .unwrap_or(&NULL)
}

/// Nulls sort last in both directions. Numbers and numeric strings compare
/// numerically, other strings case-insensitively.
pub fn compare_cells(a: &Value, b: &Value, descending: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }

    let ord = match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => cell_text(a).to_lowercase().cmp(&cell_text(b).to_lowercase()),
    };

    if descending {
        ord.reverse()
    } else {
        ord
    }
}

fn numeric(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Display form of a cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(cell_text).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// Render a record into one string per column
pub fn cells<T: Serialize>(record: &T, columns: &[Column]) -> Vec<String> {
    let value = serde_json::to_value(record).unwrap_or(Value::Null);
    columns.iter().map(|c| cell_text(lookup(&value, c.key))).collect()
}
