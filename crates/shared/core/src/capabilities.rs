//! Type-keyed bag of backend services handed to handler factories.

use crate::error::SettingsError;
use fxhash::FxHashMap;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

struct Slot {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Backend services available to handler factories, keyed by type.
///
/// Services are usually trait objects (`Arc<dyn RegistryBackend>`), so lookups are made
/// with the unsized type: `capabilities.get::<dyn RegistryBackend>()`.
#[derive(Default)]
pub struct Capabilities {
    slots: FxHashMap<TypeId, Slot>,
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.slots.values().map(|s| s.name).collect();
        names.sort_unstable();
        f.debug_struct("Capabilities").field("services", &names).finish()
    }
}

impl Capabilities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Capabilities::insert`].
    #[must_use]
    pub fn with<T: ?Sized + Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.insert(service);
        self
    }

    /// Registers `service`, replacing any earlier service of the same type.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, service: Arc<T>) {
        let slot = Slot { name: type_name::<T>(), value: Box::new(service) };
        self.slots.insert(TypeId::of::<T>(), slot);
    }

    #[must_use]
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.value.downcast_ref::<Arc<T>>())
            .cloned()
    }

    #[must_use]
    pub fn contains<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Like [`Capabilities::get`], for factories that cannot work without the service.
    ///
    /// # Errors
    /// Returns [`SettingsError::BackendUnavailable`] if no service of type `T` was provided.
    pub fn require<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, SettingsError> {
        self.get::<T>().ok_or_else(|| SettingsError::BackendUnavailable {
            message: type_name::<T>().into(),
            context: Some("Capability not provided".into()),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
