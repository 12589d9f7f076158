use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use bankseed_store::{SinkError, SinkResult};

/// When generated rows are made durable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Commit after every inserted row.
    PerRow,
    /// Commit once at the end of each generator.
    #[default]
    PerBatch,
}

/// Options for a population run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    pub users: u64,
    pub accounts: u64,
    pub transactions: u64,
    pub loans: u64,
    /// Remove previous rows (except the reserved admin) before generating.
    pub clear: bool,
    /// Seed for the run RNG; a random one is drawn and logged when absent.
    pub seed: Option<u64>,
    pub commit_mode: CommitMode,
    /// Fail instead of degrading when a phase lacks the rows it references.
    pub strict_prerequisites: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            users: 20,
            accounts: 30,
            transactions: 100,
            loans: 25,
            clear: false,
            seed: None,
            commit_mode: CommitMode::PerBatch,
            strict_prerequisites: false,
        }
    }
}

/// Per-run settings shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationContext {
    /// Reference instant all relative timestamps are computed from.
    pub now: NaiveDateTime,
    pub commit_mode: CommitMode,
    pub strict_prerequisites: bool,
}

impl GenerationContext {
    pub fn new(now: NaiveDateTime, options: &GenerateOptions) -> Self {
        Self {
            now,
            commit_mode: options.commit_mode,
            strict_prerequisites: options.strict_prerequisites,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Clear,
    Users,
    Accounts,
    Transactions,
    Loans,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Clear => "clear",
            Phase::Users => "users",
            Phase::Accounts => "accounts",
            Phase::Transactions => "transactions",
            Phase::Loans => "loans",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an attempt produced no row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub table: String,
    pub detail: String,
}

/// Result of a single insert attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<Id> {
    Inserted(Id),
    Skipped(SkipReason),
}

impl<Id> InsertOutcome<Id> {
    /// Turns a uniqueness rejection into a skip; every other error stays fatal.
    pub fn from_sink(result: SinkResult<Id>) -> Result<Self, SinkError> {
        match result {
            Ok(id) => Ok(InsertOutcome::Inserted(id)),
            Err(SinkError::UniqueViolation { table, detail }) => {
                Ok(InsertOutcome::Skipped(SkipReason {
                    table: table.to_string(),
                    detail,
                }))
            }
            Err(err) => Err(err),
        }
    }
}

/// Counters for one generator call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub requested: u64,
    pub inserted: u64,
    pub skipped: u64,
    pub skip_reasons: Vec<SkipReason>,
}

impl PhaseReport {
    pub fn new(phase: Phase, requested: u64) -> Self {
        Self {
            phase,
            requested,
            inserted: 0,
            skipped: 0,
            skip_reasons: Vec::new(),
        }
    }

    pub fn record<Id>(&mut self, outcome: &InsertOutcome<Id>) {
        match outcome {
            InsertOutcome::Inserted(_) => self.inserted += 1,
            InsertOutcome::Skipped(reason) => {
                self.skipped += 1;
                self.skip_reasons.push(reason.clone());
            }
        }
    }
}

/// Identities produced by a phase together with its counters.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutput<Id> {
    pub ids: Vec<Id>,
    pub report: PhaseReport,
}

impl<Id> PhaseOutput<Id> {
    pub fn empty(phase: Phase, requested: u64) -> Self {
        Self {
            ids: Vec::new(),
            report: PhaseReport::new(phase, requested),
        }
    }
}

/// Summary of a population run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationReport {
    pub run_id: String,
    pub seed: u64,
    pub cleared: bool,
    pub phases: Vec<PhaseReport>,
}

impl PopulationReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }
}
