//! Statement parameters and results.

use serde::{Deserialize, Serialize};
use sqlx::any::{Any, AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Column, Row};

/// A parameter or result value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double-precision float.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Parses a command-line literal: integers, floats, `true`/`false` and
    /// `null` are recognized, anything else is text.
    #[must_use]
    pub fn parse_literal(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("null") {
            Self::Null
        } else if let Ok(b) = raw.parse::<bool>() {
            Self::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            Self::Integer(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            Self::Float(f)
        } else {
            Self::Text(raw.to_string())
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Result of running one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOutput {
    /// Column names of the returned rows.
    pub columns: Vec<String>,
    /// Returned rows, one value per column.
    pub rows: Vec<Vec<Value>>,
    /// Rows changed by the statement.
    pub rows_affected: u64,
}

impl QueryOutput {
    /// Rows as JSON objects keyed by column name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| serde_json::to_value(v).unwrap_or_default()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }

    pub(crate) fn push_row(&mut self, row: &AnyRow) {
        if self.columns.is_empty() {
            self.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
        }
        let values = (0..row.len()).map(|i| decode_value(row, i)).collect();
        self.rows.push(values);
    }
}

/// Binds parameters to a query in order.
pub(crate) fn bind_params<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match param {
            Value::Null => query.bind(None::<String>),
            Value::Bool(b) => query.bind(*b),
            Value::Integer(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Bytes(b) => query.bind(b.clone()),
        };
    }
    query
}

/// Decodes a column by trying the driver-neutral types in turn.
fn decode_value(row: &AnyRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::Integer);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, Value::Float);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(Value::Null, Value::Bool);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v.map_or(Value::Null, Value::Bytes);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        assert_eq!(Value::parse_literal("42"), Value::Integer(42));
        assert_eq!(Value::parse_literal("4.5"), Value::Float(4.5));
        assert_eq!(Value::parse_literal("true"), Value::Bool(true));
        assert_eq!(Value::parse_literal("NULL"), Value::Null);
        assert_eq!(Value::parse_literal("alice"), Value::Text("alice".into()));
    }

    #[test]
    fn test_to_json() {
        let output = QueryOutput {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec![Value::Integer(1), Value::Text("alice".to_string())]],
            rows_affected: 0,
        };
        assert_eq!(
            output.to_json(),
            serde_json::json!([{"id": 1, "name": "alice"}])
        );
    }
}
