//! System settings handler slice.
//!
//! Groups tagged `systemSettings` address individual system settings by id. Each id is
//! opened once from a [`SystemSettingsProvider`] capability and cached by the handler.

mod handler;
mod memory;
mod provider;

pub use handler::SystemSettingsHandler;
pub use memory::{MemoryItem, MemorySystemSettings};
pub use provider::{SystemSettingItem, SystemSettingsProvider};

use knob_core::{HandlerKind, HandlerRegistry, SettingsError, SettingsHandler};
use std::sync::Arc;

/// Handler-type tag served by this slice.
pub const TAG: &str = HandlerKind::SYSTEM_SETTINGS;

/// Registers the system settings handler factory.
///
/// The factory needs an `Arc<dyn SystemSettingsProvider>` capability.
///
/// # Errors
/// Returns [`SettingsError::DuplicateIdentifier`] if the tag is already registered.
pub fn register(registry: &mut HandlerRegistry) -> Result<(), SettingsError> {
    registry.register(TAG, |capabilities| {
        let provider = capabilities.require::<dyn SystemSettingsProvider>()?;
        Ok(Arc::new(SystemSettingsHandler::new(provider)) as Arc<dyn SettingsHandler>)
    })
}
