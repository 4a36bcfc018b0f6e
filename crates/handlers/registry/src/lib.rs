//! Registry handler slice.
//!
//! Groups tagged `registry` address a key path (`HKEY_CURRENT_USER\Software\App`); their
//! setting ids are value names under that key. The store behind the handler is a
//! [`RegistryBackend`] supplied through [`Capabilities`](knob_core::Capabilities):
//!
//! ```rust
//! use knob_core::{Capabilities, HandlerRegistry};
//! use knob_registry::{MemoryRegistry, RegistryBackend};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn RegistryBackend> = Arc::new(MemoryRegistry::new());
//! let mut registry = HandlerRegistry::new(Capabilities::new().with(store));
//! knob_registry::register(&mut registry).unwrap();
//! assert!(registry.resolve(knob_registry::TAG).is_ok());
//! ```

mod backend;
mod error;
mod file;
mod handler;
mod memory;

pub use backend::{HIVES, KeyPath, RegistryBackend};
pub use error::{RegistryError, RegistryErrorExt};
pub use file::FileRegistry;
pub use handler::RegistryHandler;
pub use memory::{KeyValues, MemoryRegistry, Tree};

use knob_core::{HandlerKind, HandlerRegistry, SettingsError, SettingsHandler};
use std::sync::Arc;

/// Handler-type tag served by this slice.
pub const TAG: &str = HandlerKind::REGISTRY;

/// Registers the registry handler factory.
///
/// The factory needs an `Arc<dyn RegistryBackend>` capability.
///
/// # Errors
/// Returns [`SettingsError::DuplicateIdentifier`] if the tag is already registered.
pub fn register(registry: &mut HandlerRegistry) -> Result<(), SettingsError> {
    registry.register(TAG, |capabilities| {
        let backend = capabilities.require::<dyn RegistryBackend>()?;
        Ok(Arc::new(RegistryHandler::new(backend)) as Arc<dyn SettingsHandler>)
    })
}
