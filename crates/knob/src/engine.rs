use crate::config::{ConfigError, EngineConfig};
use knob_core::definition::DefinitionDocument;
use knob_core::{
    Capabilities, HandlerRegistry, Setting, SettingGroup, SettingsError, SettingsHandler, Solutions,
};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[knob_derive::knob_error]
pub enum EngineError {
    #[error("Settings error{}: {source}", format_context(.context))]
    Settings { source: SettingsError, context: Option<Cow<'static, str>> },

    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },
}

type Registration = Box<dyn FnOnce(&mut HandlerRegistry) -> Result<(), SettingsError>>;

/// Loaded solutions together with the handlers serving them.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    registry: HandlerRegistry,
    solutions: Solutions,
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn solutions(&self) -> &Solutions {
        &self.solutions
    }

    /// Looks up a group by solution and group id.
    ///
    /// # Errors
    /// Returns [`SettingsError::NotFound`] if either id is unknown.
    pub fn group(&self, solution: &str, group: &str) -> Result<Arc<SettingGroup>, SettingsError> {
        self.solutions
            .get(solution)
            .ok_or_else(|| SettingsError::NotFound {
                message: format!("solution `{solution}`").into(),
                context: None,
            })?
            .get_group(group)
    }

    /// Looks up a setting by solution, group and setting id.
    ///
    /// # Errors
    /// Returns [`SettingsError::NotFound`] if any of the ids is unknown.
    pub fn setting(
        &self,
        solution: &str,
        group: &str,
        setting: &str,
    ) -> Result<Arc<Setting>, SettingsError> {
        let found = self.group(solution, group)?.setting(setting).cloned();
        found.ok_or_else(|| SettingsError::NotFound {
            message: format!("setting `{setting}`").into(),
            context: Some(format!("Group `{solution}.{group}`").into()),
        })
    }
}

/// Step-by-step construction of an [`Engine`].
///
/// ```rust
/// use knob::Engine;
/// use knob::core::Capabilities;
/// use knob::core::definition::DefinitionDocument;
///
/// let document = DefinitionDocument::from_json("{}").unwrap();
/// let engine = Engine::builder()
///     .capabilities(Capabilities::new())
///     .register_defaults()
///     .definitions(document)
///     .load()
///     .unwrap();
/// assert!(engine.solutions().is_empty());
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    capabilities: Capabilities,
    defaults: bool,
    registrations: Vec<Registration>,
    document: Option<DefinitionDocument>,
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities)
            .field("defaults", &self.defaults)
            .field("registrations", &self.registrations.len())
            .field("document", &self.document.is_some())
            .finish()
    }
}

impl EngineBuilder {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend services handed to handler factories.
    #[must_use]
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Registers every compiled-in handler slice whose capability is provided.
    #[must_use]
    pub const fn register_defaults(mut self) -> Self {
        self.defaults = true;
        self
    }

    /// Registers an additional handler factory under `tag`.
    #[must_use]
    pub fn handler<F>(mut self, tag: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Capabilities) -> Result<Arc<dyn SettingsHandler>, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        let tag = tag.into();
        self.registrations.push(Box::new(move |registry| registry.register(tag, factory)));
        self
    }

    /// Uses `document` instead of reading [`EngineConfig::definitions`].
    #[must_use]
    pub fn definitions(mut self, document: DefinitionDocument) -> Self {
        self.document = Some(document);
        self
    }

    /// Registers handlers and loads the definitions.
    ///
    /// # Errors
    /// Returns [`EngineError::Settings`] if a registration clashes, the definitions file
    /// cannot be read, or loading fails. Nothing is returned partially built.
    pub fn load(self) -> Result<Engine, EngineError> {
        let Self { config, capabilities, defaults, registrations, document } = self;
        let mut registry = HandlerRegistry::new(capabilities);

        if defaults {
            register_defaults(&mut registry, &config)?;
        }
        for registration in registrations {
            registration(&mut registry)?;
        }

        let solutions = match document {
            Some(document) => Solutions::load(&document, &registry)?,
            None => Solutions::from_path(&config.definitions, &registry)?,
        };

        info!(solutions = solutions.len(), handlers = ?registry.tags(), "Engine ready");
        Ok(Engine { config, registry, solutions })
    }
}

#[allow(unused_variables)]
fn register_defaults(
    registry: &mut HandlerRegistry,
    config: &EngineConfig,
) -> Result<(), SettingsError> {
    #[cfg(feature = "registry")]
    if registry.capabilities().contains::<dyn knob_registry::RegistryBackend>() {
        knob_registry::register(registry)?;
    } else {
        tracing::debug!(tag = knob_registry::TAG, "Skipping handler without backend");
    }

    #[cfg(feature = "process")]
    if registry.capabilities().contains::<dyn knob_process::ProcessBackend>() {
        knob_process::register(registry, config.process)?;
    } else {
        tracing::debug!(tag = knob_process::TAG, "Skipping handler without backend");
    }

    #[cfg(feature = "display")]
    if registry.capabilities().contains::<dyn knob_display::DisplayBackend>() {
        knob_display::register(registry)?;
    } else {
        tracing::debug!(tag = knob_display::TAG, "Skipping handler without backend");
    }

    #[cfg(feature = "system-settings")]
    if registry.capabilities().contains::<dyn knob_system_settings::SystemSettingsProvider>() {
        knob_system_settings::register(registry)?;
    } else {
        tracing::debug!(tag = knob_system_settings::TAG, "Skipping handler without backend");
    }

    Ok(())
}
