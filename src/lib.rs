#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # JSON Query
//!
//! Compiles a declarative JSON query specification into calls on a query
//! builder, then executes it with a uniform pagination envelope.
//!
//! ## Overview
//!
//! A caller describes the data it wants (projection, nested AND/OR filters,
//! ordering, related rows, related-row counts and named scopes) as JSON. The
//! compiler walks that description and issues the equivalent calls on any
//! [`QueryBuilder`](capability::QueryBuilder). A PostgreSQL implementation
//! of the builder ships in [`query_builder`].
//!
//! ## Module Organization
//!
//! - [`spec`] - Typed specification tree and its JSON mapping
//! - [`capability`] - The builder interface the compiler drives
//! - [`compiler`] - Select, where, order, include and scope compilation
//! - [`query_builder`] - Models, SQL generation, execution and eager loading
//! - [`result`] - Result envelopes and diagnostic query rendering
//! - [`json_query`] - Facade pairing a builder with a specification
//! - [`database`] - Connection pool management
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use json_query::config::JsonQueryConfig;
//! use json_query::database::DatabaseConnection;
//! use json_query::query_builder::{Model, Schema, SqlQueryBuilder};
//! use json_query::result::ResultAssembler;
//! use json_query::JsonQuery;
//! use serde_json::json;
//!
//! # async fn example() -> json_query::Result<()> {
//! json_query::logging::init_structured_logging();
//!
//! let config = JsonQueryConfig::from_env()?;
//! let connection = DatabaseConnection::connect(&config).await?;
//!
//! let schema = Schema::new()
//!     .register(Model::new("User", "users").has_many("posts", "Post", "user_id", "id"))
//!     .register(Model::new("Post", "posts"))
//!     .into_shared();
//!
//! let mut query = JsonQuery::new(
//!     SqlQueryBuilder::new(schema, "User")?,
//!     r#"{"where": {"wildcard": {"fields": ["name", "posts:title"], "value": "rust"}},
//!         "include": [{"relation": "posts", "order": [{"field": "id", "order": "desc"}]}]}"#,
//! )?;
//! query.build_query()?;
//!
//! let result = query
//!     .build_result(connection.pool(), &ResultAssembler::from_config(&config), Some(20), &json!(1))
//!     .await?;
//! println!("{} of {} users", result.items.len(), result.meta.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod capability;
pub mod compiler;
pub mod config;
pub mod database;
pub mod error;
pub mod json_query;
pub mod logging;
pub mod query_builder;
pub mod result;
pub mod spec;

pub use capability::QueryBuilder;
pub use compiler::compile;
pub use config::JsonQueryConfig;
pub use error::{JsonQueryError, Result};
pub use json_query::JsonQuery;
pub use result::{QueryExecutor, QueryResult, ResultAssembler, ResultEnvelope};
pub use spec::QuerySpec;
