//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve store path and logging settings from `CAR_REPORTS_*` variables.
//!
//! # Invariants
//! - Blank variables behave as unset.
//! - `log_dir`, when present, is absolute.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "CAR_REPORTS_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "CAR_REPORTS_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CAR_REPORTS_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "car_reports.db";

#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_VAR}: {message}"),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_VAR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let log_dir = read(LOG_DIR_VAR).map(PathBuf::from);
        if let Some(dir) = &log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DB_PATH_VAR, LOG_DIR_VAR, LOG_LEVEL_VAR};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("car_reports.db"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            CoreConfig::from_lookup(lookup(&[(DB_PATH_VAR, "  "), (LOG_DIR_VAR, "")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("car_reports.db"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_normalized() {
        let dir = std::env::temp_dir();
        let dir_str = dir.to_str().unwrap();
        let config = CoreConfig::from_lookup(lookup(&[
            (DB_PATH_VAR, " /var/lib/reports.db "),
            (LOG_LEVEL_VAR, "WARNING"),
            (LOG_DIR_VAR, dir_str),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/reports.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(dir));
    }

    #[test]
    fn rejects_unknown_level_and_relative_log_dir() {
        let err = CoreConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(_)));

        let err = CoreConfig::from_lookup(lookup(&[(LOG_DIR_VAR, "logs/dev")])).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
        assert!(err.to_string().contains("absolute"));
    }
}
