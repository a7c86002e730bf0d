use serde_json::Value;

use crate::capability::{DatePart, LogicalOperator};

/// A rendered SQL snippet with the values its placeholders bind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl SqlFragment {
    pub fn new(sql: String, bindings: Vec<Value>) -> Self {
        Self { sql, bindings }
    }
}

/// Represents different types of SQL conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        field: String,
        operator: String,
        value: Value,
    },
    In {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    Between {
        field: String,
        start: Value,
        end: Value,
        negated: bool,
    },
    IsNull {
        field: String,
        negated: bool,
    },
    DatePart {
        field: String,
        part: DatePart,
        value: Value,
    },
    Exists {
        subquery: SqlFragment,
        negated: bool,
    },
    /// `(subquery) operator count`, where the subquery selects a count
    CountCompare {
        subquery: SqlFragment,
        operator: String,
        count: Value,
        negated: bool,
    },
    /// Parenthesized clauses
    Group(Vec<WhereClause>),
}

impl Condition {
    /// Convert condition to SQL, appending bound values in placeholder order
    pub fn to_sql(&self, bindings: &mut Vec<Value>) -> String {
        match self {
            Condition::Simple {
                field,
                operator,
                value,
            } => {
                bindings.push(value.clone());
                format!("{} {} ?", quote_identifier(field), operator)
            }
            Condition::In {
                field,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // Nothing is in the empty set; everything is outside it.
                    let constant = if *negated { "1 = 1" } else { "0 = 1" };
                    return constant.to_string();
                }
                bindings.extend(values.iter().cloned());
                let placeholders = vec!["?"; values.len()].join(", ");
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!("{} {keyword} ({placeholders})", quote_identifier(field))
            }
            Condition::Between {
                field,
                start,
                end,
                negated,
            } => {
                bindings.push(start.clone());
                bindings.push(end.clone());
                let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                format!("{} {keyword} ? AND ?", quote_identifier(field))
            }
            Condition::IsNull { field, negated } => {
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                format!("{} {keyword}", quote_identifier(field))
            }
            Condition::DatePart { field, part, value } => {
                bindings.push(value.clone());
                let column = quote_identifier(field);
                match part {
                    DatePart::Date => format!("{column}::date = ?"),
                    DatePart::Time => format!("{column}::time = ?"),
                    DatePart::Day => format!("extract(day from {column}) = ?"),
                    DatePart::Month => format!("extract(month from {column}) = ?"),
                    DatePart::Year => format!("extract(year from {column}) = ?"),
                }
            }
            Condition::Exists { subquery, negated } => {
                bindings.extend(subquery.bindings.iter().cloned());
                let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
                format!("{keyword} ({})", subquery.sql)
            }
            Condition::CountCompare {
                subquery,
                operator,
                count,
                negated,
            } => {
                bindings.extend(subquery.bindings.iter().cloned());
                bindings.push(count.clone());
                let comparison = format!("({}) {operator} ?", subquery.sql);
                if *negated {
                    format!("NOT ({comparison})")
                } else {
                    comparison
                }
            }
            Condition::Group(clauses) => format!("({})", render_clauses(clauses, bindings)),
        }
    }

    /// Point columns qualified with `table` at `alias` instead.
    ///
    /// Rendered subqueries are left alone.
    pub fn requalify(&mut self, table: &str, alias: &str) {
        match self {
            Condition::Simple { field, .. }
            | Condition::In { field, .. }
            | Condition::Between { field, .. }
            | Condition::IsNull { field, .. }
            | Condition::DatePart { field, .. } => {
                if let Some(column) = field
                    .strip_prefix(table)
                    .and_then(|rest| rest.strip_prefix('.'))
                {
                    *field = format!("{alias}.{column}");
                }
            }
            Condition::Group(clauses) => {
                for clause in clauses {
                    clause.condition.requalify(table, alias);
                }
            }
            Condition::Exists { .. } | Condition::CountCompare { .. } => {}
        }
    }
}

/// A condition and how it joins the clause before it
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub join: LogicalOperator,
    pub condition: Condition,
}

impl WhereClause {
    pub fn and(condition: Condition) -> Self {
        Self {
            join: LogicalOperator::And,
            condition,
        }
    }

    pub fn or(condition: Condition) -> Self {
        Self {
            join: LogicalOperator::Or,
            condition,
        }
    }
}

/// Render clauses in order; the join of the first clause is dropped
pub fn render_clauses(clauses: &[WhereClause], bindings: &mut Vec<Value>) -> String {
    let mut sql = String::new();
    for (position, clause) in clauses.iter().enumerate() {
        if position > 0 {
            sql.push(' ');
            sql.push_str(clause.join.to_sql());
            sql.push(' ');
        }
        sql.push_str(&clause.condition.to_sql(bindings));
    }
    sql
}

/// Double-quote each dot-separated part of an identifier; `*` stays bare
pub fn quote_identifier(identifier: &str) -> String {
    identifier
        .split('.')
        .map(|part| {
            if part == "*" {
                part.to_string()
            } else {
                format!("\"{}\"", part.replace('"', "\"\""))
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
