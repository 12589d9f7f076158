use thiserror::Error;

/// Errors raised by storage sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A unique constraint rejected the row. Generators skip and continue.
    #[error("unique constraint violated on {table}: {detail}")]
    UniqueViolation { table: &'static str, detail: String },
    /// A row references a parent that does not exist.
    #[error("foreign key violated on {table}: {detail}")]
    ForeignKeyViolation { table: &'static str, detail: String },
    /// The store cannot be opened or reached.
    #[error("connection error: {0}")]
    Connection(String),
    /// A statement failed for any reason other than uniqueness.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// The sink was used after `close`.
    #[error("sink is closed")]
    Closed,
}

impl SinkError {
    /// Whether the error only concerns the offending row.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, SinkError::UniqueViolation { .. })
    }
}

/// Result type for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;
