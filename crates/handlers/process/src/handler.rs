use crate::backend::{ProcessBackend, friendly_name};
use crate::config::ProcessConfig;
use knob_core::prelude::*;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Fixed handler exposing one setting, `isRunning`, for the executable at the group path.
///
/// Reading reports whether at least one matching process exists. Writing `true` starts
/// the executable unless it is already running; writing `false` asks every match to
/// close, waits up to the grace period, then kills the survivors with their children.
#[derive(Debug)]
pub struct ProcessHandler {
    backend: Arc<dyn ProcessBackend>,
    config: ProcessConfig,
}

fn group_path(setting: &Setting) -> Result<String, SettingsError> {
    let group = setting.group()?;
    if group.path().trim().is_empty() {
        return Err(SettingsError::BackendOperation {
            message: "empty executable path".into(),
            context: Some(format!("Group `{}`", group.id()).into()),
        });
    }
    Ok(group.path().to_owned())
}

fn parse_flag(value: Option<&Value>) -> Result<bool, SettingsError> {
    match value {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::String(text)) if text.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(text)) if text.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(SettingsError::SetterRejectedValue {
            message: other.map_or_else(|| "null".to_owned(), ToString::to_string).into(),
            context: Some("isRunning expects a boolean".into()),
        }),
    }
}

#[knob_core::settings_handler]
impl ProcessHandler {
    #[getter("isRunning")]
    fn is_running(&self, setting: &Setting) -> Result<Option<Value>, SettingsError> {
        let path = group_path(setting)?;
        let running = !self.backend.find(&path)?.is_empty();
        Ok(Some(Value::Bool(running)))
    }

    #[setter("isRunning")]
    async fn set_running(
        &self,
        setting: &Setting,
        value: Option<Value>,
    ) -> Result<(), SettingsError> {
        let run = parse_flag(value.as_ref())?;
        let path = group_path(setting)?;
        if run { self.start(&path) } else { self.stop(&path).await }
    }
}

impl ProcessHandler {
    #[must_use]
    pub fn new(backend: Arc<dyn ProcessBackend>, config: ProcessConfig) -> Self {
        Self { backend, config }
    }

    #[must_use]
    pub const fn config(&self) -> &ProcessConfig {
        &self.config
    }

    fn start(&self, path: &str) -> Result<(), SettingsError> {
        let running = self.backend.find(path)?;
        if !running.is_empty() {
            debug!(path, ?running, "Process already running");
            return Ok(());
        }

        let pid = self.backend.spawn(path)?;
        info!(path, pid, name = friendly_name(path), "Process launched");
        Ok(())
    }

    async fn stop(&self, path: &str) -> Result<(), SettingsError> {
        let mut survivors = self.backend.find(path)?;
        if survivors.is_empty() {
            debug!(path, "Process not running");
            return Ok(());
        }

        for &pid in &survivors {
            if let Err(err) = self.backend.request_close(pid) {
                warn!(path, pid, error = %err, "Close request failed");
            }
        }

        let deadline = Instant::now() + self.config.grace_period();
        loop {
            survivors.retain(|&pid| self.backend.is_alive(pid));
            if survivors.is_empty() {
                info!(path, "Process exited after close request");
                return Ok(());
            }
            if Instant::now() >= deadline {
                break;
            }
            sleep(self.config.poll_interval()).await;
        }

        let mut first_error = None;
        for pid in survivors {
            info!(path, pid, "Grace period expired, killing process tree");
            if let Err(err) = self.backend.kill_tree(pid) {
                warn!(path, pid, error = %err, "Kill failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}
