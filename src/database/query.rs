//! Table query builder
//!
//! Queries are plain data: the REST store renders them as PostgREST URL
//! parameters and the memory store evaluates them against JSON rows.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

/// A filter value, already in the text form the store compares against
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue(pub String);

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue(value.to_string())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue(value.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, FilterValue),
    Neq(String, FilterValue),
    Gte(String, FilterValue),
    Lte(String, FilterValue),
    IsNull(String),
    Or(Vec<Filter>),
}

impl Filter {
    /// Render as `column=op.value` for the top level
    fn to_param(&self) -> (String, String) {
        match self {
            Filter::Eq(col, v) => (col.clone(), format!("eq.{}", v.0)),
            Filter::Neq(col, v) => (col.clone(), format!("neq.{}", v.0)),
            Filter::Gte(col, v) => (col.clone(), format!("gte.{}", v.0)),
            Filter::Lte(col, v) => (col.clone(), format!("lte.{}", v.0)),
            Filter::IsNull(col) => (col.clone(), "is.null".to_string()),
            Filter::Or(filters) => (
                "or".to_string(),
                format!(
                    "({})",
                    filters.iter().map(Filter::to_inline).collect::<Vec<_>>().join(",")
                ),
            ),
        }
    }

    /// Render as `column.op.value` inside an `or=(...)` group
    fn to_inline(&self) -> String {
        match self {
            Filter::Eq(col, v) => format!("{}.eq.{}", col, quote_inline(&v.0)),
            Filter::Neq(col, v) => format!("{}.neq.{}", col, quote_inline(&v.0)),
            Filter::Gte(col, v) => format!("{}.gte.{}", col, quote_inline(&v.0)),
            Filter::Lte(col, v) => format!("{}.lte.{}", col, quote_inline(&v.0)),
            Filter::IsNull(col) => format!("{}.is.null", col),
            Filter::Or(filters) => format!(
                "or({})",
                filters.iter().map(Filter::to_inline).collect::<Vec<_>>().join(",")
            ),
        }
    }

    /// Evaluate the filter against a JSON row
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq(col, v) => cell_text(row, col).as_deref() == Some(v.0.as_str()),
            Filter::Neq(col, v) => cell_text(row, col).as_deref() != Some(v.0.as_str()),
            Filter::Gte(col, v) => cell_text(row, col)
                .map_or(false, |cell| compare_text(&cell, &v.0) != Ordering::Less),
            Filter::Lte(col, v) => cell_text(row, col)
                .map_or(false, |cell| compare_text(&cell, &v.0) != Ordering::Greater),
            Filter::IsNull(col) => row.get(col).map_or(true, Value::is_null),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(row)),
        }
    }
}

/// Values containing reserved characters must be double-quoted inside `or`
fn quote_inline(value: &str) -> String {
    if value.contains([',', '(', ')', '"', ':']) {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Text form of a cell, `None` for missing or null
pub fn cell_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric comparison when both sides parse, text comparison otherwise
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select / update / delete against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_string();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn neq(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Neq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Gte(column.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.push(Filter::Lte(column.to_string(), value.into()));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn or(mut self, filters: Vec<Filter>) -> Self {
        self.filters.push(Filter::Or(filters));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter parameters only, used for update and delete
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters.iter().map(Filter::to_param).collect()
    }

    /// Full parameter list for a select
    pub fn select_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filter_params());

        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }

    /// Whether a row passes every filter
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Sort rows by the requested order; nulls sort last
    pub fn sort(&self, rows: &mut [Value]) {
        if self.order.is_empty() {
            return;
        }
        rows.sort_by(|a, b| {
            for o in &self.order {
                let ordering = match (cell_text(a, &o.column), cell_text(b, &o.column)) {
                    (Some(x), Some(y)) => {
                        let ord = compare_text(&x, &y);
                        if o.ascending { ord } else { ord.reverse() }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}
