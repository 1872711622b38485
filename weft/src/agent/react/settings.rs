//! Plain-data agent settings, loadable from the environment or a project `.env`.
//!
//! | Variable | Setting |
//! |---|---|
//! | `WEFT_MAX_STEP` | `max_step` (positive integer) |
//! | `WEFT_RETURN_DIRECTLY` | `tool_return_directly` (comma separated) |
//! | `WEFT_STREAM_DETECTOR` | `stream_detector` (`first_chunk` or `full_consume`) |
//! | `WEFT_EXECUTE_SEQUENTIALLY` | `execute_sequentially` (`true` / `false`) |

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::detector::DetectorKind;

pub const ENV_MAX_STEP: &str = "WEFT_MAX_STEP";
pub const ENV_RETURN_DIRECTLY: &str = "WEFT_RETURN_DIRECTLY";
pub const ENV_STREAM_DETECTOR: &str = "WEFT_STREAM_DETECTOR";
pub const ENV_EXECUTE_SEQUENTIALLY: &str = "WEFT_EXECUTE_SEQUENTIALLY";

/// Errors from reading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("read .env: {0}")]
    Dotenv(String),
}

/// Settings that can come from data rather than code.
///
/// Unset fields leave the programmatic configuration unchanged; see
/// [`ReactAgentConfig::apply_settings`](super::ReactAgentConfig::apply_settings).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactSettings {
    #[serde(default)]
    pub max_step: Option<usize>,
    #[serde(default)]
    pub tool_return_directly: Vec<String>,
    #[serde(default)]
    pub stream_detector: Option<DetectorKind>,
    #[serde(default)]
    pub execute_sequentially: Option<bool>,
}

fn invalid(key: &str, message: impl Into<String>) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl ReactSettings {
    /// Reads settings through `lookup` (variable name -> value). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_step = match get(ENV_MAX_STEP) {
            Some(v) => {
                let n: usize = v
                    .trim()
                    .parse()
                    .map_err(|e| invalid(ENV_MAX_STEP, format!("{}: {}", v, e)))?;
                if n == 0 {
                    return Err(invalid(ENV_MAX_STEP, "must be at least 1"));
                }
                Some(n)
            }
            None => None,
        };
        let tool_return_directly = get(ENV_RETURN_DIRECTLY)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let stream_detector = get(ENV_STREAM_DETECTOR)
            .map(|v| v.parse::<DetectorKind>())
            .transpose()
            .map_err(|e| invalid(ENV_STREAM_DETECTOR, e))?;
        let execute_sequentially = get(ENV_EXECUTE_SEQUENTIALLY)
            .map(|v| v.trim().to_lowercase().parse::<bool>())
            .transpose()
            .map_err(|e| invalid(ENV_EXECUTE_SEQUENTIALLY, e.to_string()))?;

        Ok(Self {
            max_step,
            tool_return_directly,
            stream_detector,
            execute_sequentially,
        })
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads `dir/.env` into the environment (existing variables win), then reads settings.
    ///
    /// A missing `.env` is not an error.
    pub fn from_env_file(dir: &Path) -> Result<Self, SettingsError> {
        let path = dir.join(".env");
        if path.is_file() {
            dotenv::from_path(&path).map_err(|e| SettingsError::Dotenv(e.to_string()))?;
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_env()
    }
}
