use crate::provider::{SystemSettingItem, SystemSettingsProvider};
use knob_core::{SettingsError, Value, async_trait};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory system setting holding a single value.
#[derive(Debug, Default)]
pub struct MemoryItem {
    value: Mutex<Option<Value>>,
}

impl MemoryItem {
    #[must_use]
    pub fn new(value: Option<Value>) -> Self {
        Self { value: Mutex::new(value) }
    }

    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.value.lock().clone()
    }
}

#[async_trait]
impl SystemSettingItem for MemoryItem {
    async fn get_value(&self) -> Result<Option<Value>, SettingsError> {
        Ok(self.value())
    }

    async fn set_value(&self, value: Option<Value>) -> Result<(), SettingsError> {
        *self.value.lock() = value;
        Ok(())
    }
}

/// In-memory [`SystemSettingsProvider`] that counts how often items are opened.
#[derive(Debug, Default)]
pub struct MemorySystemSettings {
    items: RwLock<BTreeMap<String, Arc<MemoryItem>>>,
    opens: AtomicUsize,
    offline: AtomicBool,
}

impl MemorySystemSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `id` with an initial value.
    #[must_use]
    pub fn with(self, id: impl Into<String>, value: Option<Value>) -> Self {
        self.define(id, value);
        self
    }

    pub fn define(&self, id: impl Into<String>, value: Option<Value>) {
        self.items.write().insert(id.into(), Arc::new(MemoryItem::new(value)));
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<Arc<MemoryItem>> {
        self.items.read().get(id).cloned()
    }

    /// Number of successful [`SystemSettingsProvider::open`] calls so far.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl SystemSettingsProvider for MemorySystemSettings {
    fn open(&self, id: &str) -> Result<Arc<dyn SystemSettingItem>, SettingsError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettingsError::BackendUnavailable {
                message: "system settings provider".into(),
                context: Some("offline".into()),
            });
        }
        let item = self.item(id).ok_or_else(|| SettingsError::BackendOperation {
            message: id.to_owned().into(),
            context: Some("No such system setting".into()),
        })?;
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(item as Arc<dyn SystemSettingItem>)
    }
}
