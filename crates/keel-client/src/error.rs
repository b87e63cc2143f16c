//! Error types for query dispatch.

use std::time::Duration;

use keel_schema::SchemaError;

/// Errors that can occur while configuring a database target or running
/// statements against it.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing or malformed settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The pool could not hand out a connection.
    #[error("Failed to acquire a pooled connection: {0}")]
    PoolExhausted(#[source] sqlx::Error),

    /// A new connection could not be established.
    #[error("Failed to connect: {0}")]
    Connect(#[source] sqlx::Error),

    /// The driver reported a failure running a statement.
    #[error("Statement failed: {0}")]
    Execution(#[source] sqlx::Error),

    /// The statement did not complete in time.
    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    /// A blueprint failed to compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// IO error (reading configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid JSON for the expected shape.
    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
