//! Operator table: maps a condition's operator token to predicate semantics.

use serde_json::Value;

use crate::capability::DatePart;
use crate::spec::scalar_text;

/// Predicate kind selected by an operator token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Between,
    NotBetween,
    In,
    NotIn,
    Null,
    NotNull,
    DatePart(DatePart),
    Like,
    Has,
    NotHas,
    WhereHas,
    WhereNotHas,
    /// Any other token, used verbatim as the comparison operator
    Compare(String),
}

impl Operator {
    /// Look up a token case-insensitively. An empty token means `=`.
    pub fn parse(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.as_str() {
            "between" => Operator::Between,
            "not_between" => Operator::NotBetween,
            "in" => Operator::In,
            "not_in" => Operator::NotIn,
            "null" => Operator::Null,
            "not_null" => Operator::NotNull,
            "date" => Operator::DatePart(DatePart::Date),
            "day" => Operator::DatePart(DatePart::Day),
            "month" => Operator::DatePart(DatePart::Month),
            "year" => Operator::DatePart(DatePart::Year),
            "time" => Operator::DatePart(DatePart::Time),
            "like" => Operator::Like,
            "has" => Operator::Has,
            "not_has" => Operator::NotHas,
            "where_has" => Operator::WhereHas,
            "where_not_has" => Operator::WhereNotHas,
            "" => Operator::Compare("=".to_string()),
            _ => Operator::Compare(token),
        }
    }
}

/// Normalize a range/set comparand into a list.
///
/// Arrays are taken as-is, objects contribute their values in order, empty
/// values (null, false, zero, `""` and `"0"`) yield no items and any other
/// scalar is split on `,`.
pub fn value_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map.values().cloned().collect(),
        Value::Null | Value::Bool(false) => Vec::new(),
        Value::String(s) if s.is_empty() || s == "0" => Vec::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => Vec::new(),
        scalar => scalar_text(scalar)
            .split(',')
            .map(|item| Value::String(item.to_string()))
            .collect(),
    }
}

/// Wrap a `like` comparand as a substring pattern
pub fn like_pattern(value: &Value) -> Value {
    Value::String(format!("%{}%", scalar_text(value)))
}
