//! # Result Assembly
//!
//! Executes a compiled query and packages rows with a uniform pagination
//! envelope, whether or not a page size was requested.
//!
//! Execution goes through [`QueryExecutor`], so the assembler works the same
//! over [`PgExecutor`](crate::query_builder::PgExecutor) or any other backend.

pub mod assembler;
pub mod render;

pub use assembler::{normalize_page, QueryResult, ResultAssembler, ResultEnvelope};
pub use render::render_query;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// One page of rows plus the total row count of the unpaginated query
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
    pub items: Vec<Value>,
    pub total: u64,
}

/// Execution half of the builder capability
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Rows of page `page` (1-indexed) with `per_page` rows per page
    async fn paginate(&self, per_page: u64, page: u64) -> Result<Paginated>;

    /// Every row
    async fn get(&self) -> Result<Vec<Value>>;

    /// Row count of the query
    async fn count(&self) -> Result<u64>;

    /// Parameterized query text with `?` placeholders
    fn to_sql(&self) -> String;

    /// Query text as run for one page; the unpaginated text by default
    fn page_sql(&self, _per_page: u64, _page: u64) -> String {
        self.to_sql()
    }

    /// Values bound to the placeholders, in order
    fn bindings(&self) -> Vec<Value>;
}
