//! Command-line access to configured solutions.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use knob::config::{DEFAULT_CONFIG_FILE, EngineConfig, load_config};
use knob::core::{Capabilities, Value, Values};
use knob::handlers::display::{DisplayBackend, VirtualDisplay};
use knob::handlers::registry::{FileRegistry, MemoryRegistry, RegistryBackend};
use knob::{Engine, handlers};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Parser)]
#[command(name = "knob", version, about = "Read and write settings through their handlers")]
pub struct Cli {
    /// Engine configuration file (TOML, JSON or YAML).
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List solutions, groups and settings.
    List,
    /// Print the current value of one setting.
    Get { solution: String, group: String, setting: String },
    /// Write one setting; `value` is JSON, anything unparsable is taken as a string.
    Set { solution: String, group: String, setting: String, value: String },
    /// Print every setting of a group as a JSON object.
    Dump { solution: String, group: String },
}

impl Cli {
    /// Loads the engine configuration. A missing default config file means defaults.
    ///
    /// # Errors
    /// Returns an error if an explicitly named file is missing or any file is malformed.
    pub fn load_config(&self) -> anyhow::Result<EngineConfig> {
        if self.config == Path::new(DEFAULT_CONFIG_FILE) && !self.config.exists() {
            return Ok(load_config(None::<&Path>)?);
        }
        Ok(load_config(Some(&self.config))?)
    }
}

/// Backends for the compiled-in slices: the registry store selected by the config, the
/// native process backend where one exists, and a virtual display.
///
/// # Errors
/// Returns an error if the registry file exists but cannot be read.
pub async fn capabilities(config: &EngineConfig) -> anyhow::Result<Capabilities> {
    let registry: Arc<dyn RegistryBackend> = match &config.registry.file {
        Some(file) => Arc::new(
            FileRegistry::open(file)
                .await
                .with_context(|| format!("Opening registry store {}", file.display()))?,
        ),
        None => Arc::new(MemoryRegistry::new()),
    };
    let display: Arc<dyn DisplayBackend> = Arc::new(VirtualDisplay::default());
    let mut capabilities = Capabilities::new().with(registry).with(display);

    match handlers::process::native_backend() {
        Some(process) => capabilities.insert(process),
        None => warn!("No native process backend on this platform"),
    }

    debug!(?capabilities, "Capabilities ready");
    Ok(capabilities)
}

/// Parses a command-line value: JSON when it parses, a plain string otherwise, and no
/// value for `null`.
#[must_use]
pub fn parse_value(input: &str) -> Option<Value> {
    match serde_json::from_str(input) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(input.to_owned())),
    }
}

fn render(values: &Values) -> Value {
    let mut object = serde_json::Map::new();
    for entry in values {
        let rendered = match entry.value() {
            Ok(value) => value.clone().unwrap_or(Value::Null),
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };
        object.insert(entry.setting().id().to_owned(), rendered);
    }
    Value::Object(object)
}

/// Runs `command` against `engine` and returns what should be printed.
///
/// # Errors
/// Returns an error for unknown ids, handler failures, and refused writes.
pub async fn execute(engine: &Engine, command: &Command) -> anyhow::Result<String> {
    let mut out = String::new();
    match command {
        Command::List => {
            for solution in engine.solutions() {
                writeln!(out, "{}", solution.id())?;
                for group in solution.groups() {
                    writeln!(out, "  {} [{}] {}", group.id(), group.kind(), group.path())?;
                    for setting in group.settings() {
                        let data_type = setting.data_type().map_or("any", |t| t.as_str());
                        writeln!(out, "    {} ({}): {data_type}", setting.id(), setting.name())?;
                    }
                }
            }
        },
        Command::Get { solution, group, setting } => {
            let setting = engine.setting(solution, group, setting)?;
            let value = setting.get_value().await?;
            out = value.map_or_else(|| "<absent>".to_owned(), |v| v.to_string());
        },
        Command::Set { solution, group, setting, value } => {
            let target = engine.setting(solution, group, setting)?;
            if !target.set_value(parse_value(value)).await? {
                bail!("`{solution}.{group}.{setting}` refused the value {value}");
            }
            out = format!("{solution}.{group}.{setting} updated");
        },
        Command::Dump { solution, group } => {
            let values = engine.group(solution, group)?.get_all().await?;
            out = serde_json::to_string_pretty(&render(&values))?;
        },
    }
    Ok(out.trim_end().to_owned())
}
