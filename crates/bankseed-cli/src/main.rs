mod config;
mod logging;

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use thiserror::Error;

use bankseed_generate::identity::reserved_admin;
use bankseed_generate::{CommitMode, GenerationError, PopulationEngine};
use bankseed_store::{MemorySink, Sink, SinkError, SqliteSink};
use config::{SeedConfig, load_config};
use logging::init_logging;

#[derive(Debug, Error)]
enum CliError {
    #[error("storage error: {0}")]
    Sink(#[from] SinkError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CommitModeArg {
    PerRow,
    PerBatch,
}

impl From<CommitModeArg> for CommitMode {
    fn from(value: CommitModeArg) -> Self {
        match value {
            CommitModeArg::PerRow => CommitMode::PerRow,
            CommitModeArg::PerBatch => CommitMode::PerBatch,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bankseed",
    version,
    about = "Populate the banking database with synthetic users, accounts, transactions and loans"
)]
struct Cli {
    /// Path to the SQLite database (default: ../banking.db).
    #[arg(long)]
    db_path: Option<PathBuf>,
    /// Number of users to generate.
    #[arg(long)]
    users: Option<u64>,
    /// Number of accounts to generate.
    #[arg(long)]
    accounts: Option<u64>,
    /// Number of transactions to generate.
    #[arg(long)]
    transactions: Option<u64>,
    /// Number of loans to generate.
    #[arg(long)]
    loans: Option<u64>,
    /// Clear existing data before inserting new data.
    #[arg(long, default_value_t = false)]
    clear: bool,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// When generated rows are committed.
    #[arg(long, value_enum)]
    commit_mode: Option<CommitModeArg>,
    /// Fail instead of skipping phases that lack referenced rows.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Create missing tables and the reserved admin before generating.
    #[arg(long, default_value_t = false)]
    init_schema: bool,
    /// Generate into memory without touching the database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// TOML file with defaults for the options above.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also write JSON log lines to this file.
    #[arg(long)]
    log_json: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file values.
    fn apply(&self, mut config: SeedConfig) -> SeedConfig {
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        let generate = &mut config.generate;
        if let Some(users) = self.users {
            generate.users = users;
        }
        if let Some(accounts) = self.accounts {
            generate.accounts = accounts;
        }
        if let Some(transactions) = self.transactions {
            generate.transactions = transactions;
        }
        if let Some(loans) = self.loans {
            generate.loans = loans;
        }
        if let Some(seed) = self.seed {
            generate.seed = Some(seed);
        }
        if let Some(mode) = self.commit_mode {
            generate.commit_mode = mode.into();
        }
        generate.clear |= self.clear;
        generate.strict_prerequisites |= self.strict;
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json.as_deref())?;

    let config = cli.apply(load_config(cli.config.as_deref())?);

    let mut sink = open_sink(cli.dry_run, &config.db_path).await?;

    if cli.init_schema
        && let Err(err) = bootstrap(sink.as_mut()).await
    {
        if let Err(close_err) = sink.close().await {
            tracing::warn!(event = "sink_close_failed", error = %close_err);
        }
        return Err(err);
    }

    let engine = PopulationEngine::new(config.generate);
    engine.run_and_close(sink.as_mut()).await?;

    Ok(())
}

async fn open_sink(dry_run: bool, db_path: &Path) -> Result<Box<dyn Sink>, CliError> {
    if dry_run {
        tracing::info!(event = "sink_opened", engine = "memory", "Dry run: writing to memory");
        return Ok(Box::new(MemorySink::new()));
    }
    let sink = open_sqlite(db_path).await?;
    tracing::info!(
        event = "sink_opened",
        engine = "sqlite",
        path = %db_path.display(),
        "Connected to database: {}",
        db_path.display()
    );
    Ok(Box::new(sink))
}

async fn open_sqlite(path: &Path) -> Result<SqliteSink, CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(SqliteSink::open(path).await?)
}

async fn bootstrap(sink: &mut dyn Sink) -> Result<(), CliError> {
    sink.ensure_schema().await?;
    let admin = reserved_admin(&mut rand::rng(), Utc::now().naive_utc());
    match sink.ensure_reserved_admin(&admin).await? {
        Some(id) => tracing::info!(event = "reserved_admin_created", user_id = %id),
        None => tracing::info!(event = "reserved_admin_present"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bankseed_generate::CommitMode;

    use super::*;
    use crate::config::parse_config;

    fn file_config() -> SeedConfig {
        parse_config(
            r#"
db_path = "data/bank.db"
users = 9
accounts = 14
commit_mode = "per_batch"
"#,
        )
        .expect("config parses")
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::try_parse_from([
            "bankseed",
            "--users",
            "3",
            "--commit-mode",
            "per-row",
            "--clear",
        ])
        .expect("flags parse");

        let config = cli.apply(file_config());
        assert_eq!(config.generate.users, 3);
        assert_eq!(config.generate.commit_mode, CommitMode::PerRow);
        assert!(config.generate.clear);
    }

    #[test]
    fn omitted_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["bankseed", "--seed", "7"]).expect("flags parse");

        let config = cli.apply(file_config());
        assert_eq!(config.db_path, PathBuf::from("data/bank.db"));
        assert_eq!(config.generate.users, 9);
        assert_eq!(config.generate.accounts, 14);
        assert_eq!(config.generate.commit_mode, CommitMode::PerBatch);
        assert_eq!(config.generate.seed, Some(7));
        assert!(!config.generate.clear);
        assert!(!config.generate.strict_prerequisites);
    }

    #[test]
    fn unknown_commit_mode_is_rejected() {
        let result = Cli::try_parse_from(["bankseed", "--commit-mode", "never"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn dry_run_writes_to_memory() {
        let missing = std::env::temp_dir()
            .join(format!("bankseed_cli_{}", uuid::Uuid::new_v4()))
            .join("bank.db");

        let mut sink = open_sink(true, &missing).await.expect("memory sink");
        assert_eq!(sink.engine(), "memory");
        sink.close().await.expect("close");
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn open_sqlite_creates_missing_parent_dir() {
        let root = std::env::temp_dir().join(format!("bankseed_cli_{}", uuid::Uuid::new_v4()));
        let path = root.join("nested").join("bank.db");

        let mut sink = open_sink(false, &path).await.expect("sqlite sink");
        assert_eq!(sink.engine(), "sqlite");
        assert!(root.join("nested").is_dir());
        sink.close().await.expect("close");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }
}
