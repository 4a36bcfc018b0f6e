use crate::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;

pub(crate) const DEFAULT_MAX_FILES: usize = 10;

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(value: LogRotation) -> Self {
        match value {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

/// Serializable logger settings, as found in the `[logging]` table of the engine config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Identifies the application; also the prefix of rolled log files.
    pub name: String,
    /// Minimum level: `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    pub console: bool,
    /// Write rolling log files into this directory when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    pub rotation: LogRotation,
    /// Extra directives such as `knob_process=debug`.
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "knob".to_owned(),
            level: "info".to_owned(),
            console: true,
            directory: None,
            json: false,
            max_files: DEFAULT_MAX_FILES,
            rotation: LogRotation::default(),
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// Parses [`LoggingConfig::level`].
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, LoggerError> {
        LevelFilter::from_str(self.level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid level '{}': {e}", self.level).into(),
            context: Some("logging.level".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.name, "knob");
        assert!(config.console);
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{ "level": "debug", "rotation": "hourly" }"#).unwrap();
        assert_eq!(config.level_filter().unwrap(), LevelFilter::DEBUG);
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert_eq!(config.name, "knob");
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig { level: "loud".into(), ..LoggingConfig::default() };
        assert!(matches!(config.level_filter(), Err(LoggerError::InvalidConfiguration { .. })));
    }
}
