use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_GRACE_PERIOD_MS: u64 = 2_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Timing of the cooperative stop.
///
/// After the close request, matching processes get `grace_period_ms` to exit; they are
/// polled every `poll_interval_ms`. Survivors are then killed with their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub grace_period_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self { grace_period_ms: DEFAULT_GRACE_PERIOD_MS, poll_interval_ms: DEFAULT_POLL_INTERVAL_MS }
    }
}

impl ProcessConfig {
    #[must_use]
    pub const fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    /// Poll interval, never shorter than one millisecond.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
