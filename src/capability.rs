//! # Query Builder Capability
//!
//! The interface the compiler drives. Implementations own the query being
//! constructed and answer model-introspection questions about the entity
//! they target; the compiler never sees tables, dialects or relation types
//! beyond what this trait exposes.
//!
//! [`SqlQueryBuilder`](crate::query_builder::SqlQueryBuilder) is the
//! PostgreSQL implementation shipped with this crate.

use serde_json::Value;

use crate::error::Result;

pub use crate::compiler::includes::RelationLoad;

/// Boolean join of a predicate to the one preceding it in its group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn to_sql(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Sort direction of an `order by` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive; anything other than `asc`/`desc` means ascending
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Date/time component compared by the date-part operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Day,
    Month,
    Year,
    Time,
}

/// A single column predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field operator value`, including `like`
    Compare {
        field: String,
        operator: String,
        value: Value,
    },
    Between {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    In {
        field: String,
        values: Vec<Value>,
        negated: bool,
    },
    Null {
        field: String,
        negated: bool,
    },
    DatePart {
        field: String,
        part: DatePart,
        value: Value,
    },
}

/// Related types an existence check may match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelatedTypes {
    /// The single type declared by a non-polymorphic relation
    Declared,
    /// Any type a polymorphic relation may point at
    Any,
}

/// Whether an existence check requires or forbids related rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Present,
    Absent,
}

/// Primary key, table and forced projection of the target entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMeta {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    pub mandatory_fields: Vec<String>,
}

impl EntityMeta {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            primary_key: "id".to_string(),
            mandatory_fields: Vec::new(),
        }
    }
}

/// Callback receiving a nested or relation-scoped builder
pub type Configure<'a> = &'a mut dyn FnMut(&mut dyn QueryBuilder) -> Result<()>;

/// Operations a compiled specification is expressed in.
///
/// Every mutator returns `Result` so implementations can reject what their
/// backend cannot express; the compiler propagates such errors unchanged.
pub trait QueryBuilder {
    /// Metadata of the entity this builder targets
    fn entity(&self) -> &EntityMeta;

    /// Whether `relation` may point at rows of several entity types
    fn is_polymorphic(&self, relation: &str) -> bool;

    fn select(&mut self, fields: Vec<String>) -> Result<()>;

    fn order_by(&mut self, field: &str, direction: Direction) -> Result<()>;

    fn where_predicate(&mut self, join: LogicalOperator, predicate: Predicate) -> Result<()>;

    /// Parenthesized group; `configure` fills it through a nested builder
    fn where_group(&mut self, join: LogicalOperator, configure: Configure<'_>) -> Result<()>;

    /// Existence of related rows, optionally quantified by `operator count`.
    /// A null `count` means plain existence.
    fn has(
        &mut self,
        join: LogicalOperator,
        relation: &str,
        types: RelatedTypes,
        existence: Existence,
        operator: &str,
        count: &Value,
    ) -> Result<()>;

    /// Existence of related rows matching the predicates `configure` adds
    fn where_has(
        &mut self,
        join: LogicalOperator,
        relation: &str,
        types: RelatedTypes,
        existence: Existence,
        configure: Configure<'_>,
    ) -> Result<()>;

    /// Register relations to eager-load alongside the result
    fn with(&mut self, loads: Vec<RelationLoad>) -> Result<()>;

    /// Register relations whose row counts are projected alongside the result
    fn with_count(&mut self, loads: Vec<RelationLoad>) -> Result<()>;

    /// Apply a named scope; unknown names fail with `UnknownScope`
    fn call_scope(&mut self, name: &str, args: &[Value]) -> Result<()>;
}
