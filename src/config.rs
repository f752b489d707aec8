//! Runtime configuration loaded from the process environment.

use std::path::PathBuf;

use crate::adapters::IntegrityPolicy;
use crate::{HeartCheckError, Result};

pub const DEFAULT_MODEL_PATH: &str = "model/bernoulli_naive_bayes_model.json";
pub const DEFAULT_SCALER_PATH: &str = "model/scaler.json";
pub const DEFAULT_LOG_FILE: &str = "heartcheck.log";

/// Where log output goes. The TUI owns the terminal, so `Auto` picks a file
/// when stdout is interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to write to the log file given the terminal state.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Snapshot of configuration values read at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub integrity: IntegrityPolicy,
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl AppConfig {
    /// Read the configuration from `HEARTCHECK_*` environment variables.
    ///
    /// # Errors
    /// Returns `HeartCheckError::Config` if a configured public key cannot be
    /// read or parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    /// Returns `HeartCheckError::Config` if a configured public key cannot be
    /// read or parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path_or = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };

        let pubkey_b64 = match (
            lookup("HEARTCHECK_ARTIFACT_PUBKEY_B64"),
            lookup("HEARTCHECK_ARTIFACT_PUBKEY_B64_FILE"),
        ) {
            (Some(b64), _) => Some(b64),
            (None, Some(path)) => Some(std::fs::read_to_string(path.trim()).map_err(|e| {
                HeartCheckError::Config(format!("Failed reading public key file: {e}"))
            })?),
            (None, None) => None,
        };
        let public_key = pubkey_b64
            .map(|b64| IntegrityPolicy::parse_public_key(&b64))
            .transpose()
            .map_err(|e| HeartCheckError::Config(e.to_string()))?;

        Ok(Self {
            model_path: path_or("HEARTCHECK_MODEL_PATH", DEFAULT_MODEL_PATH),
            scaler_path: path_or("HEARTCHECK_SCALER_PATH", DEFAULT_SCALER_PATH),
            log_mode: lookup("HEARTCHECK_LOG_MODE")
                .map(|v| LogMode::parse(&v))
                .unwrap_or_default(),
            log_file: path_or("HEARTCHECK_LOG_FILE", DEFAULT_LOG_FILE),
            integrity: IntegrityPolicy {
                require_signed: lookup("HEARTCHECK_REQUIRE_SIGNED_ARTIFACTS")
                    .is_some_and(|v| parse_bool(&v)),
                public_key,
            },
        })
    }
}
