// ⚙️ Configuration - environment variables (optionally from a .env file)

use crate::parser::ParserKind;
use crate::rules::KeywordTables;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const KEYWORDS_FILE_VAR: &str = "EXPENSE_KEYWORDS_FILE";
pub const SINK_FILE_VAR: &str = "EXPENSE_SINK_FILE";
pub const LOG_LEVEL_VAR: &str = "EXPENSE_LOG_LEVEL";
pub const PARSER_VAR: &str = "EXPENSE_PARSER";

pub const DEFAULT_SINK_FILE: &str = "expenses.jsonl";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// JSON keyword tables replacing the built-in ones
    pub keywords_file: Option<PathBuf>,
    /// Where `chat` appends accepted expenses
    pub sink_file: PathBuf,
    /// env_logger filter used when RUST_LOG is unset
    pub log_level: String,
    pub parser: ParserKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keywords_file: None,
            sink_file: PathBuf::from(DEFAULT_SINK_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            parser: ParserKind::Rules,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let parser = match get(PARSER_VAR) {
            Some(value) => value
                .parse::<ParserKind>()
                .with_context(|| format!("Invalid {}", PARSER_VAR))?,
            None => defaults.parser,
        };

        Ok(Config {
            keywords_file: get(KEYWORDS_FILE_VAR).map(PathBuf::from),
            sink_file: get(SINK_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.sink_file),
            log_level: get(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            parser,
        })
    }

    /// Built-in tables unless a keywords file is configured
    pub fn keyword_tables(&self) -> Result<KeywordTables> {
        match &self.keywords_file {
            Some(path) => KeywordTables::from_file(path),
            None => Ok(KeywordTables::default()),
        }
    }
}
