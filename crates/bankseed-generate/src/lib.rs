//! Constrained synthetic data generation for the banking store.
//!
//! Users feed accounts, accounts feed transactions, and users feed loans. Every
//! generator draws from a caller-provided RNG so seeded runs are reproducible.

pub mod accounts;
mod batch;
pub mod engine;
pub mod errors;
pub mod identity;
pub mod loans;
pub mod model;
pub mod random;
pub mod transactions;
pub mod users;

pub use engine::{PopulationEngine, clear_data};
pub use errors::GenerationError;
pub use model::{
    CommitMode, GenerateOptions, GenerationContext, InsertOutcome, Phase, PhaseOutput,
    PhaseReport, PopulationReport, SkipReason,
};
