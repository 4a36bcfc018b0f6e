use crate::backend::{KeyPath, RegistryBackend};
use knob_core::prelude::*;
use tracing::{debug, warn};

/// Generic handler for registry-style stores.
///
/// The group path is the key path and each setting id is a value name under that key.
#[derive(Debug)]
pub struct RegistryHandler {
    backend: Arc<dyn RegistryBackend>,
}

impl RegistryHandler {
    #[must_use]
    pub fn new(backend: Arc<dyn RegistryBackend>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn RegistryBackend> {
        &self.backend
    }

    async fn open(&self, group: &SettingGroup) -> Result<KeyPath, SettingsError> {
        let path = KeyPath::parse(group.path()).map_err(SettingsError::from)?;
        self.backend.open(&path).await?;
        Ok(path)
    }
}

fn check_type(setting: &Setting, value: Option<&Value>) -> Result<(), SettingsError> {
    match (setting.data_type(), value) {
        (Some(expected), Some(value)) if !expected.accepts(value) => {
            Err(SettingsError::SetterRejectedValue {
                message: format!("{value} is not a {expected}").into(),
                context: Some(format!("Setting `{}`", setting.id()).into()),
            })
        },
        _ => Ok(()),
    }
}

#[async_trait]
impl SettingsHandler for RegistryHandler {
    async fn get(
        &self,
        group: &SettingGroup,
        settings: &[Arc<Setting>],
    ) -> Result<Values, SettingsError> {
        let path = self.open(group).await?;
        let mut values = Values::with_capacity(settings.len());

        for setting in settings {
            match self.backend.read(&path, setting.id()).await.map_err(SettingsError::from) {
                Ok(value) => values.insert(Arc::clone(setting), value),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => {
                    warn!(group = group.id(), setting = setting.id(), error = %err, "Read failed");
                    values.fail(Arc::clone(setting), err);
                },
            }
        }

        debug!(group = group.id(), path = group.path(), count = values.len(), "Registry read");
        Ok(values)
    }

    async fn set(&self, group: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError> {
        let path = self.open(group).await?;
        let mut report = SetReport::new();

        for (setting, value) in values.assignments() {
            let result = match check_type(setting, value.as_ref()) {
                Ok(()) => self
                    .backend
                    .write(&path, setting.id(), value.as_ref())
                    .await
                    .map_err(SettingsError::from),
                Err(err) => Err(err),
            };
            match result {
                Ok(()) => report.applied(setting.id()),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => report.failed(setting.id(), err),
            }
        }

        debug!(group = group.id(), path = group.path(), "Registry write");
        Ok(report)
    }
}
