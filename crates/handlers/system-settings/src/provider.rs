use knob_core::{SettingsError, Value, async_trait};
use std::fmt::Debug;
use std::sync::Arc;

/// One system setting, opened by id.
///
/// Items may hold platform resources; the handler opens each id once and keeps the item.
#[async_trait]
pub trait SystemSettingItem: Debug + Send + Sync {
    /// # Errors
    /// Returns an error if the value cannot be read.
    async fn get_value(&self) -> Result<Option<Value>, SettingsError>;

    /// # Errors
    /// Returns [`SettingsError::SetterRejectedValue`] for values the setting does not
    /// accept, or a backend error.
    async fn set_value(&self, value: Option<Value>) -> Result<(), SettingsError>;
}

/// Source of [`SystemSettingItem`]s.
pub trait SystemSettingsProvider: Debug + Send + Sync {
    /// Opens the item for `id`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BackendOperation`] for an unknown id and
    /// [`SettingsError::BackendUnavailable`] if the provider itself is unusable.
    fn open(&self, id: &str) -> Result<Arc<dyn SystemSettingItem>, SettingsError>;
}
