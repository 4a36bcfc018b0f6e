use crate::error::SettingsError;
use crate::group::SettingGroup;
use crate::value::{DataType, Value};
use crate::values::Values;
use std::sync::{Arc, Weak};

/// One logical, named value inside a [`SettingGroup`].
///
/// A `Setting` is a descriptor only: reading or writing it goes through the owning
/// group's handler and never mutates the descriptor itself.
#[derive(Debug)]
pub struct Setting {
    id: String,
    name: String,
    data_type: Option<DataType>,
    group: Weak<SettingGroup>,
}

impl Setting {
    pub(crate) fn new(
        id: String,
        name: Option<String>,
        data_type: Option<DataType>,
        group: Weak<SettingGroup>,
    ) -> Self {
        let name = name.unwrap_or_else(|| id.clone());
        Self { id, name, data_type, group }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name; defaults to the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn data_type(&self) -> Option<DataType> {
        self.data_type
    }

    /// Upgrades the back-reference to the owning group.
    ///
    /// # Errors
    /// Returns [`SettingsError::Detached`] if the group (and its solution) was dropped.
    pub fn group(&self) -> Result<Arc<SettingGroup>, SettingsError> {
        self.group.upgrade().ok_or_else(|| SettingsError::Detached {
            message: self.id.clone().into(),
            context: Some("Owning group is no longer loaded".into()),
        })
    }

    /// Reads the current value through the owning group's handler.
    ///
    /// `Ok(None)` means the backend has no value for this setting.
    ///
    /// # Errors
    /// Returns the per-entry error recorded by the handler (for example
    /// [`SettingsError::NoBindingForSetting`]) or a batch-level backend failure.
    pub async fn get_value(self: &Arc<Self>) -> Result<Option<Value>, SettingsError> {
        let group = self.group()?;
        let values = group.get(std::slice::from_ref(self)).await?;
        values.into_single(&self.id)
    }

    /// Writes a new value through the owning group's handler.
    ///
    /// Returns `Ok(false)` if the handler refused the entry; the reason is logged.
    ///
    /// # Errors
    /// Returns an error only if the whole call failed (detached setting or an
    /// unavailable backend).
    pub async fn set_value(self: &Arc<Self>, value: Option<Value>) -> Result<bool, SettingsError> {
        let group = self.group()?;
        let values = Values::new().with(Arc::clone(self), value);
        group.set(&values).await
    }
}
