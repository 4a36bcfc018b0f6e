use crate::cache::HandlerCache;
use crate::capabilities::Capabilities;
use crate::error::SettingsError;
use crate::handler::SettingsHandler;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type Factory =
    Box<dyn Fn(&Capabilities) -> Result<Arc<dyn SettingsHandler>, SettingsError> + Send + Sync>;

/// Maps handler-type tags to handler factories and memoizes the constructed handlers.
///
/// Built once at process start. Every tag is constructed at most once; later resolutions
/// of the same tag share the instance.
pub struct HandlerRegistry {
    capabilities: Capabilities,
    factories: FxHashMap<String, Factory>,
    instances: HandlerCache<dyn SettingsHandler>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("capabilities", &self.capabilities)
            .field("tags", &self.tags())
            .field("instances", &self.instances)
            .finish()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new(Capabilities::default())
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities, factories: FxHashMap::default(), instances: HandlerCache::new() }
    }

    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Registers the factory for `tag`.
    ///
    /// # Errors
    /// Returns [`SettingsError::DuplicateIdentifier`] if `tag` is already registered.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> Result<(), SettingsError>
    where
        F: Fn(&Capabilities) -> Result<Arc<dyn SettingsHandler>, SettingsError>
            + Send
            + Sync
            + 'static,
    {
        let tag = tag.into();
        if self.factories.contains_key(&tag) {
            return Err(SettingsError::DuplicateIdentifier {
                message: tag.into(),
                context: Some("Handler type already registered".into()),
            });
        }
        debug!(tag = %tag, "Registered handler factory");
        self.factories.insert(tag, Box::new(factory));
        Ok(())
    }

    /// Returns the handler for `tag`, constructing it on first use.
    ///
    /// # Errors
    /// Returns [`SettingsError::UnknownHandlerType`] if nothing is registered under `tag`,
    /// or the factory's error (nothing is cached in that case).
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn SettingsHandler>, SettingsError> {
        let factory = self.factories.get(tag).ok_or_else(|| SettingsError::UnknownHandlerType {
            message: tag.to_owned().into(),
            context: None,
        })?;

        self.instances.try_get_or_insert_with(tag, || {
            debug!(tag, "Constructing handler");
            factory(&self.capabilities)
        })
    }

    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
