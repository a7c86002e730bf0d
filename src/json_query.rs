//! # JSON Query Facade
//!
//! Pairs one builder with one parsed specification and exposes each compile
//! stage individually, plus execution for the PostgreSQL backend.
//!
//! ```rust
//! use json_query::query_builder::{Model, Schema, SqlQueryBuilder};
//! use json_query::JsonQuery;
//!
//! let schema = Schema::new().register(Model::new("User", "users")).into_shared();
//! let builder = SqlQueryBuilder::new(schema, "User").unwrap();
//!
//! let mut query = JsonQuery::new(builder, r#"{"select": ["name"], "order": [{"field": "name"}]}"#).unwrap();
//! query.build_query().unwrap();
//!
//! assert_eq!(
//!     query.query().build_sql(),
//!     r#"SELECT "users"."id", "users"."name" FROM "users" ORDER BY "name" ASC"#
//! );
//! ```

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::capability::QueryBuilder;
use crate::compiler::{
    compile_include_counts, compile_includes, compile_order, compile_scopes, compile_select,
    compile_where,
};
use crate::error::Result;
use crate::query_builder::{PgExecutor, SqlQueryBuilder};
use crate::result::{QueryResult, ResultAssembler};
use crate::spec::QuerySpec;

/// A builder and the specification being compiled onto it
#[derive(Debug, Clone)]
pub struct JsonQuery<B: QueryBuilder> {
    query: B,
    raw: Value,
    spec: QuerySpec,
}

impl<B: QueryBuilder> JsonQuery<B> {
    /// Parse `json` for `query`. Blank input is an empty specification.
    pub fn new(query: B, json: &str) -> Result<Self> {
        let raw = if json.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(json)?
        };
        let spec = QuerySpec::from_value(raw.clone())?;
        Ok(Self { query, raw, spec })
    }

    pub fn from_spec(query: B, spec: QuerySpec) -> Self {
        Self {
            query,
            raw: Value::Null,
            spec,
        }
    }

    pub fn query(&self) -> &B {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut B {
        &mut self.query
    }

    pub fn into_query(self) -> B {
        self.query
    }

    /// Input as parsed JSON; null when built from a specification
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Run every stage: select, where, order, include, include count, scopes
    pub fn build_query(&mut self) -> Result<&mut Self> {
        debug!(entity = %self.query.entity().name, "building json query");
        self.build_select()?
            .build_where()?
            .build_order()?
            .build_include()?
            .build_include_count()?
            .build_scopes()
    }

    pub fn build_select(&mut self) -> Result<&mut Self> {
        compile_select(&mut self.query, &self.spec.select)?;
        Ok(self)
    }

    pub fn build_where(&mut self) -> Result<&mut Self> {
        if let Some(node) = &self.spec.where_ {
            compile_where(&mut self.query, node)?;
        }
        Ok(self)
    }

    pub fn build_order(&mut self) -> Result<&mut Self> {
        compile_order(&mut self.query, &self.spec.order)?;
        Ok(self)
    }

    pub fn build_include(&mut self) -> Result<&mut Self> {
        compile_includes(&mut self.query, &self.spec.include)?;
        Ok(self)
    }

    pub fn build_include_count(&mut self) -> Result<&mut Self> {
        compile_include_counts(&mut self.query, &self.spec.include_count)?;
        Ok(self)
    }

    pub fn build_scopes(&mut self) -> Result<&mut Self> {
        compile_scopes(&mut self.query, &self.spec.scopes)?;
        Ok(self)
    }

    /// Apply argument-less scopes in order, outside the specification
    pub fn add_scopes(&mut self, scopes: &[&str]) -> Result<&mut Self> {
        for scope in scopes {
            self.query.call_scope(scope, &[])?;
        }
        Ok(self)
    }
}

impl JsonQuery<SqlQueryBuilder> {
    /// Execute the compiled query on `pool`.
    ///
    /// `limit` of `None` or zero fetches every row; `page` is normalized as
    /// described on [`normalize_page`](crate::result::normalize_page).
    pub async fn build_result(
        &self,
        pool: &PgPool,
        assembler: &ResultAssembler,
        limit: Option<u64>,
        page: &Value,
    ) -> Result<QueryResult> {
        let executor = PgExecutor::new(self.query.clone(), pool.clone());
        assembler.assemble(&executor, limit, page).await
    }
}
