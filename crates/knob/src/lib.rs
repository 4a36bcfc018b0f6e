//! Facade crate for the settings engine and its handler slices.
//! Re-exports the core and logger crates and wires compiled-in slices into an [`Engine`].
//! Keep this crate thin: it composes other crates and does not dispatch on its own.
//!
//! ## Usage
//! - Add `knob` with the desired slice features (`registry`, `process`, `display`,
//!   `system-settings`, or `full`).
//! - Load an [`EngineConfig`](config::EngineConfig) with [`config::load_config`], provide
//!   backends through [`Capabilities`](knob_core::Capabilities), then build the
//!   [`Engine`].

pub mod config;
mod engine;

pub use engine::{Engine, EngineBuilder, EngineError, EngineErrorExt};
pub use knob_core as core;
pub use knob_logger as logger;

/// Handler slices compiled into this build.
pub mod handlers {
    #[cfg(feature = "display")]
    pub use knob_display as display;
    #[cfg(feature = "process")]
    pub use knob_process as process;
    #[cfg(feature = "registry")]
    pub use knob_registry as registry;
    #[cfg(feature = "system-settings")]
    pub use knob_system_settings as system_settings;

    /// Handler-type tags of the compiled-in slices.
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "registry")]
        knob_core::HandlerKind::REGISTRY,
        #[cfg(feature = "display")]
        knob_core::HandlerKind::DISPLAY,
        #[cfg(feature = "process")]
        knob_core::HandlerKind::PROCESS,
        #[cfg(feature = "system-settings")]
        knob_core::HandlerKind::SYSTEM_SETTINGS,
    ];

    #[must_use]
    pub fn is_enabled(tag: &str) -> bool {
        ENABLED.contains(&tag)
    }
}
