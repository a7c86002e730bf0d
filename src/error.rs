//! # Error Types
//!
//! Structured errors for specification mapping, compilation and execution.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonQueryError {
    #[error("Malformed query specification: {0}")]
    MalformedSpec(String),

    #[error("Unknown scope '{scope}' on {entity}")]
    UnknownScope { scope: String, entity: String },

    #[error("Unknown relation '{relation}' on {entity}")]
    UnknownRelation { relation: String, entity: String },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JsonQueryError {
    pub fn unknown_scope(scope: &str, entity: &str) -> Self {
        Self::UnknownScope {
            scope: scope.to_string(),
            entity: entity.to_string(),
        }
    }

    pub fn unknown_relation(relation: &str, entity: &str) -> Self {
        Self::UnknownRelation {
            relation: relation.to_string(),
            entity: entity.to_string(),
        }
    }
}

impl From<serde_json::Error> for JsonQueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedSpec(err.to_string())
    }
}

impl From<config::ConfigError> for JsonQueryError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JsonQueryError>;
