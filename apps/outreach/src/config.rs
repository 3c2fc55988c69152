use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::context::DEFAULT_CONTEXT_WINDOW;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_FROM_NAME: &str = "Candidate";
const DEFAULT_LETTERS_DIR: &str = "out_letters";
const DEFAULT_SEND_LOG_PATH: &str = "sent_log.csv";

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Without a key, emails use the generic template and letters are unavailable.
    pub anthropic_api_key: Option<String>,
    pub categories_path: Option<PathBuf>,
    pub context_window: usize,
    pub fetch_timeout_secs: u64,
    pub from_name: String,
    pub from_address: Option<String>,
    pub cv_path: Option<PathBuf>,
    pub letter_template_path: Option<PathBuf>,
    pub letters_dir: PathBuf,
    /// Written after every real send.
    pub send_log_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Config {
            port: parse_or(optional("PORT"), "PORT", DEFAULT_PORT)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            categories_path: optional("CATEGORIES_PATH").map(PathBuf::from),
            context_window: parse_or(
                optional("CONTEXT_WINDOW"),
                "CONTEXT_WINDOW",
                DEFAULT_CONTEXT_WINDOW,
            )?,
            fetch_timeout_secs: parse_or(
                optional("FETCH_TIMEOUT_SECS"),
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?,
            from_name: optional("FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            from_address: optional("FROM_ADDRESS"),
            cv_path: optional("CV_PATH").map(PathBuf::from),
            letter_template_path: optional("LETTER_TEMPLATE_PATH").map(PathBuf::from),
            letters_dir: optional("LETTERS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LETTERS_DIR)),
            send_log_path: optional("SEND_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEND_LOG_PATH)),
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{v}'")),
        None => Ok(default),
    }
}
