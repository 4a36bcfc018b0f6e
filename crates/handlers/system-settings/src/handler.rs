use crate::provider::{SystemSettingItem, SystemSettingsProvider};
use knob_core::prelude::*;
use tracing::{debug, warn};

/// Generic handler that maps each setting id to a [`SystemSettingItem`].
///
/// Items are opened on first use and kept in a [`HandlerCache`] owned by the handler, so
/// every id is opened at most once. A failed open is retried on the next call.
#[derive(Debug)]
pub struct SystemSettingsHandler {
    provider: Arc<dyn SystemSettingsProvider>,
    items: HandlerCache<dyn SystemSettingItem>,
}

impl SystemSettingsHandler {
    #[must_use]
    pub fn new(provider: Arc<dyn SystemSettingsProvider>) -> Self {
        Self { provider, items: HandlerCache::new() }
    }

    #[must_use]
    pub const fn items(&self) -> &HandlerCache<dyn SystemSettingItem> {
        &self.items
    }

    fn item(&self, id: &str) -> Result<Arc<dyn SystemSettingItem>, SettingsError> {
        self.items.try_get_or_insert_with(id, || self.provider.open(id))
    }

    async fn read(&self, setting: &Setting) -> Result<Option<Value>, SettingsError> {
        self.item(setting.id())?.get_value().await
    }

    async fn write(&self, setting: &Setting, value: Option<&Value>) -> Result<(), SettingsError> {
        if let (Some(expected), Some(value)) = (setting.data_type(), value)
            && !expected.accepts(value)
        {
            return Err(SettingsError::SetterRejectedValue {
                message: format!("{value} is not a {expected}").into(),
                context: Some(format!("Setting `{}`", setting.id()).into()),
            });
        }
        self.item(setting.id())?.set_value(value.cloned()).await
    }
}

#[async_trait]
impl SettingsHandler for SystemSettingsHandler {
    async fn get(
        &self,
        group: &SettingGroup,
        settings: &[Arc<Setting>],
    ) -> Result<Values, SettingsError> {
        let mut values = Values::with_capacity(settings.len());
        for setting in settings {
            match self.read(setting).await {
                Ok(value) => values.insert(Arc::clone(setting), value),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => {
                    warn!(group = group.id(), setting = setting.id(), error = %err, "Read failed");
                    values.fail(Arc::clone(setting), err);
                },
            }
        }
        debug!(group = group.id(), count = values.len(), "System settings read");
        Ok(values)
    }

    async fn set(&self, group: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError> {
        let mut report = SetReport::new();
        for (setting, value) in values.assignments() {
            match self.write(setting, value.as_ref()).await {
                Ok(()) => report.applied(setting.id()),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => report.failed(setting.id(), err),
            }
        }
        debug!(group = group.id(), applied = report.applied_ids().len(), "System settings write");
        Ok(report)
    }
}
