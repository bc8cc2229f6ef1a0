//! Error types for sqlcraft.

use thiserror::Error;

use crate::serializer::StatementType;

/// The main error type for sqlcraft operations.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Opening the session or the liveness check failed.
    #[error("Connection error ({description}): {message}")]
    Connection { description: String, message: String },

    /// Schema introspection failed.
    #[error("Metadata retrieval error for schema '{schema}'{}: {message}", table_suffix(.table))]
    MetadataRetrieval {
        schema: String,
        table: Option<String>,
        message: String,
    },

    /// An expression node is not valid for the statement or dialect it was serialized in.
    #[error("Unsupported construct in {statement} statement: {construct}")]
    UnsupportedConstruct {
        construct: String,
        statement: StatementType,
    },

    /// A statement lacks a clause it cannot be rendered without.
    #[error("{statement} statement requires a {clause} clause")]
    MissingClause {
        statement: StatementType,
        clause: &'static str,
    },

    /// Two schema identifiers map to the same generated identifier.
    #[error("Name collision in '{table}': '{first}' and '{second}' both generate '{identifier}'")]
    NameCollision {
        table: String,
        identifier: String,
        first: String,
        second: String,
    },

    /// A schema identifier has nothing to build a generated identifier from.
    #[error("Cannot derive an identifier from '{name}' in '{table}'")]
    InvalidIdentifier { table: String, name: String },

    /// A database type name could not be parsed.
    #[error("Cannot parse type '{input}': {message}")]
    TypeParse { input: String, message: String },

    /// A query failed while executing on an open session.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn table_suffix(table: &Option<String>) -> String {
    match table {
        Some(t) => format!(", table '{}'", t),
        None => String::new(),
    }
}

impl SqlError {
    /// Create an unsupported-construct error.
    pub fn unsupported(construct: impl Into<String>, statement: StatementType) -> Self {
        Self::UnsupportedConstruct {
            construct: construct.into(),
            statement,
        }
    }

    /// Create a metadata error scoped to a schema.
    pub fn metadata(schema: &str, message: impl Into<String>) -> Self {
        Self::MetadataRetrieval {
            schema: schema.to_string(),
            table: None,
            message: message.into(),
        }
    }
}

/// Result type alias for sqlcraft operations.
pub type SqlResult<T> = Result<T, SqlError>;
