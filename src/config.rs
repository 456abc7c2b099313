//! Runtime configuration
//!
//! Everything comes from environment variables (optionally seeded from a
//! `.env` file by `main`). Only the Gemini API key is mandatory.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::db::LoadOptions;
use crate::llm::advice::DEFAULT_ADVICE_LANGUAGE;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};

pub const ENV_NUTRITION_PATH: &str = "NUTCHAT_NUTRITION_PATH";
pub const ENV_NUTRITION_TABLE: &str = "NUTCHAT_NUTRITION_TABLE";
pub const ENV_SKIP_ROWS: &str = "NUTCHAT_SKIP_ROWS";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "NUTCHAT_MODEL";
pub const ENV_LLM_BASE_URL: &str = "NUTCHAT_LLM_BASE_URL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "NUTCHAT_LLM_TIMEOUT_SECS";
pub const ENV_BIND: &str = "NUTCHAT_BIND";
pub const ENV_CORS_ORIGINS: &str = "NUTCHAT_CORS_ORIGINS";
pub const ENV_ADVICE_LANGUAGE: &str = "NUTCHAT_ADVICE_LANGUAGE";

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Service configuration
#[derive(Clone)]
pub struct Config {
    pub nutrition_path: PathBuf,
    pub load: LoadOptions,
    pub api_key: String,
    pub model: String,
    pub llm_base_url: String,
    pub llm_timeout: Duration,
    /// Language the dietary advice is written in
    pub advice_language: String,
    pub bind_addr: SocketAddr,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let nutrition_path = get(ENV_NUTRITION_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_nutrition_path);

        let load = LoadOptions {
            table: get(ENV_NUTRITION_TABLE).unwrap_or_else(|| LoadOptions::default().table),
            skip_rows: parse_opt(get(ENV_SKIP_ROWS), ENV_SKIP_ROWS)?,
        };

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?;

        let llm_timeout = match get(ENV_LLM_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_LLM_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        let bind_addr = parse_or(
            get(ENV_BIND),
            ENV_BIND,
            DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
                var: ENV_BIND,
                value: DEFAULT_BIND.to_string(),
            })?,
        )?;

        let cors_origins = get(ENV_CORS_ORIGINS).map(|raw| {
            raw.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        Ok(Self {
            nutrition_path,
            load,
            api_key,
            model: get(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_base_url: get(ENV_LLM_BASE_URL)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            advice_language: get(ENV_ADVICE_LANGUAGE)
                .unwrap_or_else(|| DEFAULT_ADVICE_LANGUAGE.to_string()),
            llm_timeout,
            bind_addr,
            cors_origins,
        })
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field("nutrition_path", &self.nutrition_path)
            .field("load", &self.load)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_timeout", &self.llm_timeout)
            .field("advice_language", &self.advice_language)
            .field("bind_addr", &self.bind_addr)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

fn parse_opt<T: FromStr>(
    raw: Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    raw.map(|value| value.parse().map_err(|_| ConfigError::Invalid { var, value }))
        .transpose()
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    Ok(parse_opt(raw, var)?.unwrap_or(default))
}

/// `data/nutrition.db` next to the project root (or the executable)
fn default_nutrition_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutrition.db");
    path
}
