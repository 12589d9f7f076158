use thiserror::Error;

/// Core error type shared across bankseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A row violates a domain invariant.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Convenience alias for results returned by bankseed crates.
pub type Result<T> = std::result::Result<T, Error>;
