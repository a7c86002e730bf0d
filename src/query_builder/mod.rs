//! # PostgreSQL Query Builder
//!
//! Reference backend for the compiler: a model layer plus an SQL builder
//! implementing [`QueryBuilder`](crate::capability::QueryBuilder).
//!
//! ## Key Components
//!
//! - [`schema`] - Models, relations and named scopes
//! - [`builder`] - SQL generation with `?` placeholders and ordered bindings
//! - [`conditions`] - WHERE clause rendering
//! - [`pagination`] - LIMIT/OFFSET windows and page arithmetic
//! - [`executor`] - Execution on a `sqlx` pool, rows returned as JSON
//! - [`eager`] - Post-fetch loading of included relations
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use json_query::compiler::compile;
//! use json_query::query_builder::{PgExecutor, Schema, SqlQueryBuilder};
//! use json_query::result::QueryExecutor;
//!
//! let mut query = SqlQueryBuilder::new(schema.clone(), "User")?;
//! compile(&mut query, &spec)?;
//!
//! let rows = PgExecutor::new(query, pool).get().await?;
//! ```

pub mod builder;
pub mod conditions;
pub mod eager;
pub mod executor;
pub mod pagination;
pub mod schema;

pub use builder::SqlQueryBuilder;
pub use conditions::{Condition, SqlFragment, WhereClause};
pub use executor::{inline_bindings, PgExecutor};
pub use pagination::Pagination;
pub use schema::{Model, MorphType, Relation, RelationKind, Schema, ScopeFn};
