//! Process handler slice.
//!
//! Groups tagged `process` name an executable in their path and expose a single boolean
//! setting, `isRunning`. Writing `false` performs a cooperative stop with a grace period
//! before the process tree is killed; see [`ProcessHandler`].

mod backend;
mod config;
mod error;
mod handler;
#[cfg(target_os = "linux")]
mod native;

pub use backend::{ProcessBackend, friendly_name};
pub use config::ProcessConfig;
pub use error::{ProcessError, ProcessErrorExt};
pub use handler::ProcessHandler;
#[cfg(target_os = "linux")]
pub use native::LinuxProcesses;

use knob_core::fixed::FixedDispatch;
use knob_core::{HandlerKind, HandlerRegistry, SettingsError};
use std::sync::Arc;

/// Handler-type tag served by this slice.
pub const TAG: &str = HandlerKind::PROCESS;

/// Registers the process handler factory.
///
/// The factory needs an `Arc<dyn ProcessBackend>` capability; `config` controls the
/// stop timing of every group it serves.
///
/// # Errors
/// Returns [`SettingsError::DuplicateIdentifier`] if the tag is already registered.
pub fn register(registry: &mut HandlerRegistry, config: ProcessConfig) -> Result<(), SettingsError> {
    registry.register(TAG, move |capabilities| {
        let backend = capabilities.require::<dyn ProcessBackend>()?;
        Ok(FixedDispatch::new(ProcessHandler::new(backend, config)).into_shared())
    })
}

/// The process backend of the running platform, if there is one.
#[must_use]
pub fn native_backend() -> Option<Arc<dyn ProcessBackend>> {
    #[cfg(target_os = "linux")]
    {
        Some(Arc::new(LinuxProcesses::new()))
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}
