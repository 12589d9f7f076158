use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use bankseed_generate::GenerateOptions;

use crate::CliError;

pub const DEFAULT_DB_PATH: &str = "../banking.db";

/// Contents of an optional `--config` TOML file.
///
/// ```toml
/// db_path = "data/banking.db"
/// users = 50
/// commit_mode = "per_row"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub db_path: PathBuf,
    #[serde(flatten)]
    pub generate: GenerateOptions,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            generate: GenerateOptions::default(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<SeedConfig, CliError> {
    let Some(path) = path else {
        return Ok(SeedConfig::default());
    };
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<SeedConfig, CliError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use bankseed_generate::CommitMode;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse_config("").expect("parse");
        assert_eq!(config, SeedConfig::default());
        assert_eq!(config.generate.users, 20);
        assert_eq!(config.generate.accounts, 30);
        assert_eq!(config.generate.transactions, 100);
        assert_eq!(config.generate.loans, 25);
    }

    #[test]
    fn file_values_override_defaults() {
        let config = parse_config(
            r#"
            db_path = "data/bank.db"
            users = 5
            clear = true
            seed = 17
            commit_mode = "per_row"
            "#,
        )
        .expect("parse");
        assert_eq!(config.db_path, PathBuf::from("data/bank.db"));
        assert_eq!(config.generate.users, 5);
        assert_eq!(config.generate.accounts, 30);
        assert!(config.generate.clear);
        assert_eq!(config.generate.seed, Some(17));
        assert_eq!(config.generate.commit_mode, CommitMode::PerRow);
    }

    #[test]
    fn unknown_commit_mode_is_rejected() {
        assert!(parse_config("commit_mode = \"sometimes\"").is_err());
    }
}
