//! # Database Connection
//!
//! Pool management for the PostgreSQL backend. Queries themselves are built
//! by [`SqlQueryBuilder`](crate::query_builder::SqlQueryBuilder) and run by
//! [`PgExecutor`](crate::query_builder::PgExecutor).

pub mod connection;

pub use connection::DatabaseConnection;
