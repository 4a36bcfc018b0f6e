use config::{Config, Environment, File};
use knob_logger::LoggingConfig;
#[cfg(feature = "process")]
use knob_process::ProcessConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides; `KNOB__LOGGING__LEVEL` maps to `logging.level`.
pub const ENV_PREFIX: &str = "KNOB";

/// Config file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "knob.toml";

#[knob_derive::knob_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Engine configuration, usually read from `knob.toml`.
///
/// ```toml
/// definitions = "solutions.json"
///
/// [logging]
/// level = "debug"
///
/// [process]
/// grace_period_ms = 5000
///
/// [registry]
/// file = "registry.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JSON or TOML document with the solution definitions.
    pub definitions: PathBuf,
    pub logging: LoggingConfig,
    #[cfg(feature = "process")]
    pub process: ProcessConfig,
    #[cfg(feature = "registry")]
    pub registry: RegistryConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            definitions: PathBuf::from("solutions.json"),
            logging: LoggingConfig::default(),
            #[cfg(feature = "process")]
            process: ProcessConfig::default(),
            #[cfg(feature = "registry")]
            registry: RegistryConfig::default(),
        }
    }
}

/// Registry store selection.
#[cfg(feature = "registry")]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Persist the registry store to this JSON file; in memory when unset.
    pub file: Option<PathBuf>,
}

/// Loads configuration from a file layered under `KNOB__` environment overrides.
///
/// With `Some(path)` the file must exist; its format follows the extension. With `None`,
/// [`DEFAULT_CONFIG_FILE`] is read if present and defaults apply otherwise. Nested keys
/// are separated by a double underscore in variable names.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or malformed, or if the merged
/// values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use knob::config::{EngineConfig, load_config};
///
/// let config: EngineConfig = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build(path.as_ref().map(|p| p.as_ref()), None)
}

fn build<T>(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = path.map_or_else(
        || File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        |p| File::from(p).required(true),
    );
    let environment = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .convert_case(config::Case::Snake)
        .source(env);

    info!(path = %path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)).display(), "Loading config");

    let config = Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
