// Configuration management for scheduler

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How entries under a target are removed during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeleteMode {
    #[default]
    RecycleBin,
    PermanentDelete,
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteMode::RecycleBin => f.write_str("RecycleBin"),
            DeleteMode::PermanentDelete => f.write_str("PermanentDelete"),
        }
    }
}

/// One configured cleanup target. The path does not have to exist at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    #[serde(alias = "Path")]
    pub path: PathBuf,
    #[serde(default, alias = "DeleteMode")]
    pub delete_mode: DeleteMode,
}

impl TargetSpec {
    pub fn new(path: impl Into<PathBuf>, delete_mode: DeleteMode) -> Self {
        Self {
            path: path.into(),
            delete_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Sweep order follows file order.
    #[serde(default, alias = "TempFolders")]
    pub targets: Vec<TargetSpec>,
    #[serde(alias = "IntervalHours")]
    pub interval_hours: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("impossible de lire le fichier de configuration {path}: {source}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fichier de configuration invalide {path}: {source}")]
    ParseFailure {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("le fichier de configuration {path} est vide")]
    Empty { path: PathBuf },
    #[error("intervalHours doit être un nombre positif et fini (reçu {value})")]
    InvalidInterval { value: f64 },
}

impl ScheduleConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailure {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parses a configuration document. `origin` is only used in error messages.
    pub fn parse(origin: &Path, content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Err(ConfigError::Empty {
                path: origin.to_path_buf(),
            });
        }

        let config: Option<ScheduleConfig> =
            serde_json::from_str(content).map_err(|source| ConfigError::ParseFailure {
                path: origin.to_path_buf(),
                source,
            })?;

        let config = config.ok_or_else(|| ConfigError::Empty {
            path: origin.to_path_buf(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval_hours.is_finite() || self.interval_hours <= 0.0 {
            return Err(ConfigError::InvalidInterval {
                value: self.interval_hours,
            });
        }
        Ok(())
    }
}
