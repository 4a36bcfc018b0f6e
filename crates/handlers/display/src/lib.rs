//! Display handler slice.
//!
//! Groups tagged `display` expose `zoom`, `resolution` and the read-only `resolutions`
//! list of the primary display, through a [`DisplayBackend`] capability.

mod backend;
mod error;
mod handler;
mod memory;
mod mode;

pub use backend::{DisplayBackend, ZOOM_LEVELS};
pub use error::{DisplayError, DisplayErrorExt};
pub use handler::DisplayHandler;
pub use memory::VirtualDisplay;
pub use mode::Resolution;

use knob_core::fixed::FixedDispatch;
use knob_core::{HandlerKind, HandlerRegistry, SettingsError};

/// Handler-type tag served by this slice.
pub const TAG: &str = HandlerKind::DISPLAY;

/// Registers the display handler factory.
///
/// The factory needs an `Arc<dyn DisplayBackend>` capability.
///
/// # Errors
/// Returns [`SettingsError::DuplicateIdentifier`] if the tag is already registered.
pub fn register(registry: &mut HandlerRegistry) -> Result<(), SettingsError> {
    registry.register(TAG, |capabilities| {
        let backend = capabilities.require::<dyn DisplayBackend>()?;
        Ok(FixedDispatch::new(DisplayHandler::new(backend)).into_shared())
    })
}
