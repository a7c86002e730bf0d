use serde::Deserialize;

use super::{null_as_default, ScopeDecl, WhereNode};
use crate::error::{JsonQueryError, Result};

/// One level of a query: the root entity or a related entity
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuerySpec {
    #[serde(deserialize_with = "null_as_default")]
    pub select: Vec<String>,

    #[serde(rename = "where")]
    pub where_: Option<WhereNode>,

    #[serde(deserialize_with = "null_as_default")]
    pub order: Vec<OrderItem>,

    #[serde(deserialize_with = "null_as_default")]
    pub include: Vec<IncludeNode>,

    #[serde(alias = "includeCount", deserialize_with = "null_as_default")]
    pub include_count: Vec<IncludeCountNode>,

    #[serde(deserialize_with = "null_as_default")]
    pub scopes: ScopeDecl,
}

impl QuerySpec {
    /// Map a JSON document onto a specification.
    ///
    /// Blank input yields an empty specification, which compiles to a plain
    /// `select table.*`.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| JsonQueryError::MalformedSpec(e.to_string()))
    }

    /// Map an already-parsed JSON value onto a specification
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| JsonQueryError::MalformedSpec(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_empty()
            && self.where_.is_none()
            && self.order.is_empty()
            && self.include.is_empty()
            && self.include_count.is_empty()
            && self.scopes.is_empty()
    }
}

/// A single `order by` pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderItem {
    pub field: String,

    /// Raw direction token; normalized to `asc`/`desc` at compile time
    #[serde(alias = "order", default, deserialize_with = "null_as_default")]
    pub direction: String,
}

impl OrderItem {
    pub fn new(field: &str, direction: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: direction.to_string(),
        }
    }
}

/// Eager-load instruction: a relation plus the spec shaping its rows
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncludeNode {
    pub relation: String,

    #[serde(flatten)]
    pub spec: QuerySpec,
}

impl IncludeNode {
    pub fn new(relation: &str, spec: QuerySpec) -> Self {
        Self {
            relation: relation.to_string(),
            spec,
        }
    }
}

/// Relation-count instruction; only filtering and scopes apply to counts
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncludeCountNode {
    pub relation: String,

    #[serde(rename = "where", default)]
    pub where_: Option<WhereNode>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scopes: ScopeDecl,
}

impl IncludeCountNode {
    pub fn new(relation: &str) -> Self {
        Self {
            relation: relation.to_string(),
            where_: None,
            scopes: ScopeDecl::default(),
        }
    }
}
