//! Human-readable rendering of a parameterized query.
//!
//! The output is for logs and diagnostics only. Values are spliced in without
//! escaping, so the text is neither injection-safe nor guaranteed to be
//! executable.

use serde_json::Value;

/// Placeholder token in builder-generated SQL
pub const PLACEHOLDER: char = '?';

/// Substitute each `?` left to right with its bound value.
///
/// Numbers and numeric strings are spliced bare; everything else is wrapped
/// in single quotes. Placeholders inside quoted identifiers or literals are
/// left alone, and surplus placeholders stay as `?`.
pub fn render_query(sql: &str, bindings: &[Value]) -> String {
    let mut values = bindings.iter();
    let mut rendered = String::with_capacity(sql.len());
    for segment in split_placeholders(sql) {
        match segment {
            Segment::Text(text) => rendered.push_str(text),
            Segment::Placeholder => match values.next() {
                Some(value) => rendered.push_str(&render_value(value)),
                None => rendered.push(PLACEHOLDER),
            },
        }
    }
    rendered
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) if is_numeric(s) => s.clone(),
        Value::String(s) => format!("'{s}'"),
        Value::Null => "''".to_string(),
        Value::Bool(true) => "'1'".to_string(),
        Value::Bool(false) => "''".to_string(),
        other => format!("'{other}'"),
    }
}

/// Decimal or scientific notation with optional sign and surrounding spaces
fn is_numeric(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && trimmed.parse::<f64>().is_ok()
}

/// Piece of SQL text between placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Placeholder,
}

/// Split SQL on placeholders that sit outside quoted identifiers and literals
pub fn split_placeholders(sql: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (index, c) in sql.char_indices() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, PLACEHOLDER) => {
                if start < index {
                    segments.push(Segment::Text(&sql[start..index]));
                }
                segments.push(Segment::Placeholder);
                start = index + c.len_utf8();
            }
            (None, _) => {}
        }
    }

    if start < sql.len() {
        segments.push(Segment::Text(&sql[start..]));
    }
    segments
}
