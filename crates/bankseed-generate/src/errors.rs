use bankseed_store::SinkError;
use thiserror::Error;

use crate::model::Phase;

/// Errors emitted by the generators and the population engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("storage error: {0}")]
    Sink(#[from] SinkError),
    /// A built row breaks a domain invariant and was not submitted.
    #[error("invalid row: {0}")]
    InvalidRow(#[from] bankseed_core::Error),
    /// A phase cannot produce valid references from its inputs.
    #[error("{phase} cannot be generated: {detail}")]
    EmptyPrerequisite { phase: Phase, detail: String },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}
