//! Configuration management for the solace application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. It covers the database location, which text
//! generation backend to use and how to reach it, where local model artifacts live,
//! and how mood ratings are scored.
//!
//! # Environment Variables
//!
//! - `SOLACE_DB`: Path to the SQLite database (defaults to ~/.local/share/solace/solace.db)
//! - `SOLACE_BACKEND`: `remote`, `local` or `auto` (defaults to `auto`)
//! - `OPENAI_API_KEY`: Credential for the remote backend
//! - `SOLACE_API_BASE`: Remote API base URL (defaults to https://api.openai.com/v1)
//! - `SOLACE_CHAT_MODEL`: Remote chat model (defaults to gpt-3.5-turbo)
//! - `SOLACE_REQUEST_TIMEOUT`: Remote request timeout in seconds (defaults to 30)
//! - `SOLACE_MODEL_DIR`: Local generator artifacts
//! - `SOLACE_SENTIMENT_MODEL_DIR`: Sentiment classifier artifacts
//! - `SOLACE_MOOD_SCALE`: `raw` or `centered` (defaults to `raw`)

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_CHAT_MODEL, DEFAULT_DB_PATH, DEFAULT_MODEL_DIR,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SENTIMENT_MODEL_DIR, ENV_VAR_OPENAI_API_KEY,
    ENV_VAR_SOLACE_API_BASE, ENV_VAR_SOLACE_BACKEND, ENV_VAR_SOLACE_CHAT_MODEL,
    ENV_VAR_SOLACE_DB, ENV_VAR_SOLACE_MODEL_DIR, ENV_VAR_SOLACE_MOOD_SCALE,
    ENV_VAR_SOLACE_REQUEST_TIMEOUT, ENV_VAR_SOLACE_SENTIMENT_MODEL_DIR, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::sentiment::MoodScale;
use reqwest::Url;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which text generation backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// OpenAI-compatible chat completions API.
    Remote,
    /// ONNX model on local disk.
    Local,
    /// Remote when an API key is configured, local otherwise.
    #[default]
    Auto,
}

impl BackendKind {
    /// Resolves `Auto` to a concrete backend.
    pub fn resolve(self, has_api_key: bool) -> BackendKind {
        match self {
            BackendKind::Auto if has_api_key => BackendKind::Remote,
            BackendKind::Auto => BackendKind::Local,
            concrete => concrete,
        }
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "local" => Ok(BackendKind::Local),
            "auto" => Ok(BackendKind::Auto),
            other => Err(AppError::Config(format!(
                "Invalid backend '{}'. Expected 'remote', 'local' or 'auto'",
                other
            ))),
        }
    }
}

/// Configuration for the solace application.
///
/// # Examples
///
/// Starting from defaults and overriding a field:
/// ```
/// use solace::config::{BackendKind, Config};
///
/// let config = Config {
///     backend: BackendKind::Local,
///     ..Config::default()
/// };
/// assert_eq!(config.effective_backend(), BackendKind::Local);
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use solace::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// config.validate().expect("Invalid configuration");
/// ```
#[derive(Clone)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub backend: BackendKind,
    /// Bearer credential for the remote backend. Never printed.
    pub api_key: Option<String>,
    pub api_base: String,
    pub chat_model: String,
    pub request_timeout: Duration,
    /// Directory holding the local generator's `model.onnx` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Directory holding the sentiment classifier's `model.onnx` and `tokenizer.json`.
    pub sentiment_model_dir: PathBuf,
    pub mood_scale: MoodScale,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &"[REDACTED_PATH]")
            .field("backend", &self.backend)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("api_base", &self.api_base)
            .field("chat_model", &self.chat_model)
            .field("request_timeout", &self.request_timeout)
            .field("model_dir", &"[REDACTED_PATH]")
            .field("sentiment_model_dir", &"[REDACTED_PATH]")
            .field("mood_scale", &self.mood_scale)
            .finish()
    }
}

impl Default for Config {
    /// Defaults with unexpanded paths; use [`Config::load`] for real values.
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(""),
            backend: BackendKind::default(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            model_dir: PathBuf::from(""),
            sentiment_model_dir: PathBuf::from(""),
            mood_scale: MoodScale::default(),
        }
    }
}

/// Reads an environment variable, treating unset and blank the same.
fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Expands `~` and environment references in a path.
fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - A path fails to expand
    /// - `SOLACE_BACKEND` or `SOLACE_MOOD_SCALE` has an unknown value
    /// - `SOLACE_REQUEST_TIMEOUT` is not a whole number of seconds
    ///
    /// Semantic checks (absolute paths, URL scheme) are left to [`Config::validate`].
    pub fn load() -> AppResult<Self> {
        let db_path =
            expand_path(&env_value(ENV_VAR_SOLACE_DB).unwrap_or_else(|| DEFAULT_DB_PATH.into()))?;
        let model_dir = expand_path(
            &env_value(ENV_VAR_SOLACE_MODEL_DIR).unwrap_or_else(|| DEFAULT_MODEL_DIR.into()),
        )?;
        let sentiment_model_dir = expand_path(
            &env_value(ENV_VAR_SOLACE_SENTIMENT_MODEL_DIR)
                .unwrap_or_else(|| DEFAULT_SENTIMENT_MODEL_DIR.into()),
        )?;

        let backend = match env_value(ENV_VAR_SOLACE_BACKEND) {
            Some(raw) => raw.parse()?,
            None => BackendKind::default(),
        };

        let mood_scale = match env_value(ENV_VAR_SOLACE_MOOD_SCALE) {
            Some(raw) => raw.parse()?,
            None => MoodScale::default(),
        };

        let request_timeout = match env_value(ENV_VAR_SOLACE_REQUEST_TIMEOUT) {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                AppError::Config(format!(
                    "{} must be a whole number of seconds: {}",
                    ENV_VAR_SOLACE_REQUEST_TIMEOUT, e
                ))
            })?),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Config {
            db_path,
            backend,
            api_key: env_value(ENV_VAR_OPENAI_API_KEY),
            api_base: env_value(ENV_VAR_SOLACE_API_BASE)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            chat_model: env_value(ENV_VAR_SOLACE_CHAT_MODEL)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            request_timeout,
            model_dir,
            sentiment_model_dir,
            mood_scale,
        })
    }

    /// The backend actually used, with `Auto` resolved.
    pub fn effective_backend(&self) -> BackendKind {
        self.backend.resolve(self.api_key.is_some())
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The database path is empty or relative
    /// - The API base URL is malformed, or plain http to a non-local host
    /// - The request timeout is zero
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if !self.db_path.is_absolute() {
            return Err(AppError::Config(
                "Database path must be an absolute path".to_string(),
            ));
        }

        validate_api_base(&self.api_base)?;

        if self.request_timeout.is_zero() {
            return Err(AppError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Accepts https anywhere, and plain http only for loopback hosts.
fn validate_api_base(api_base: &str) -> AppResult<()> {
    let url = Url::parse(api_base)
        .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {}", api_base, e)))?;

    match url.scheme() {
        "https" => Ok(()),
        "http" => match url.host_str() {
            Some("localhost") | Some("127.0.0.1") | Some("[::1]") => Ok(()),
            _ => Err(AppError::Config(format!(
                "API base URL must use https unless it points at localhost: {}",
                api_base
            ))),
        },
        other => Err(AppError::Config(format!(
            "Unsupported API base URL scheme '{}'",
            other
        ))),
    }
}
