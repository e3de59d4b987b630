//! Error types for schema reconciliation.

/// Errors that can occur while reconciling a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The database session could not be established or was lost.
    #[error("Database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    /// A catalog introspection query failed. No partial results are
    /// returned when this occurs.
    #[error("Failed to introspect {context}: {source}")]
    Introspection {
        /// What was being read (table list, columns of a table).
        context: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The desired schema is malformed (invalid table name, etc.).
    /// Raised before any statement executes.
    #[error("Invalid schema: {0}")]
    Validation(String),

    /// The desired schema is ambiguous or contradictory, e.g. more than
    /// one field marked as primary key.
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    /// A single DDL statement failed. The statement was rolled back;
    /// statements committed earlier in the same plan remain applied.
    #[error("Statement failed: {statement}: {source}")]
    Statement {
        /// The DDL statement that failed.
        statement: String,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },

    /// IO error (reading a config or schema file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
