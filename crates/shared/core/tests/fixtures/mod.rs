#![allow(dead_code)]

use knob_core::prelude::*;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub const DEFINITIONS: &str = r#"{
    "editor": {
        "prefs": {
            "path": "Software\\Editor",
            "handlerType": "map",
            "settings": {
                "settingOne": { "name": "First", "dataType": "string" },
                "settingTwo": { "dataType": "string" },
                "settingThree": {}
            }
        },
        "climate": {
            "handlerType": "thermostat",
            "settings": {
                "target": { "dataType": "integer" },
                "reading": {},
                "humidity": {}
            }
        }
    },
    "viewer": {
        "prefs": {
            "path": "Software\\Viewer",
            "handlerType": "map",
            "settings": { "settingOne": {} }
        }
    }
}"#;

/// Generic handler backed by a map keyed `path\id`.
#[derive(Debug, Default)]
pub struct MapHandler {
    store: Mutex<BTreeMap<String, Value>>,
    broken: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl MapHandler {
    pub fn seed(&self, path: &str, id: &str, value: Value) {
        self.store.lock().insert(format!("{path}\\{id}"), value);
    }

    /// Makes every access to `id` fail with a per-entry error.
    pub fn break_setting(&self, id: &str) {
        self.broken.lock().push(id.to_owned());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> String {
        serde_json::to_string_pretty(&*self.store.lock()).expect("serializable")
    }

    fn check_online(&self) -> Result<(), SettingsError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettingsError::BackendUnavailable {
                message: "map store".into(),
                context: Some("offline".into()),
            });
        }
        Ok(())
    }

    fn is_broken(&self, id: &str) -> bool {
        self.broken.lock().iter().any(|b| b == id)
    }
}

fn operation_failed(id: &str) -> SettingsError {
    SettingsError::BackendOperation { message: id.to_owned().into(), context: None }
}

#[async_trait]
impl SettingsHandler for MapHandler {
    async fn get(
        &self,
        group: &SettingGroup,
        settings: &[Arc<Setting>],
    ) -> Result<Values, SettingsError> {
        self.check_online()?;
        let store = self.store.lock();
        let mut values = Values::new();
        for setting in settings {
            if self.is_broken(setting.id()) {
                values.fail(Arc::clone(setting), operation_failed(setting.id()));
                continue;
            }
            let key = format!("{}\\{}", group.path(), setting.id());
            values.insert(Arc::clone(setting), store.get(&key).cloned());
        }
        drop(store);
        Ok(values)
    }

    async fn set(&self, group: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError> {
        self.check_online()?;
        let mut store = self.store.lock();
        let mut report = SetReport::new();
        for (setting, value) in values.assignments() {
            if self.is_broken(setting.id()) {
                report.failed(setting.id(), operation_failed(setting.id()));
                continue;
            }
            let key = format!("{}\\{}", group.path(), setting.id());
            match value {
                Some(value) => store.insert(key, value.clone()),
                None => store.remove(&key),
            };
            report.applied(setting.id());
        }
        drop(store);
        Ok(report)
    }
}

#[derive(Debug, Default)]
pub struct Thermostat {
    target: Mutex<i64>,
    offline: AtomicBool,
}

impl Thermostat {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), SettingsError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SettingsError::BackendUnavailable {
                message: "thermostat".into(),
                context: None,
            });
        }
        Ok(())
    }
}

#[knob_core::settings_handler]
impl Thermostat {
    #[getter("target")]
    async fn target(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        self.check_online()?;
        Ok(Some(Value::from(*self.target.lock())))
    }

    #[setter("target")]
    async fn set_target(
        &self,
        _setting: &Setting,
        value: Option<Value>,
    ) -> Result<(), SettingsError> {
        self.check_online()?;
        let target = value.as_ref().and_then(Value::as_i64).filter(|t| (5..=30).contains(t));
        let target = target.ok_or_else(|| SettingsError::SetterRejectedValue {
            message: format!("{value:?}").into(),
            context: Some("Expected an integer between 5 and 30".into()),
        })?;
        *self.target.lock() = target;
        Ok(())
    }

    #[getter("reading")]
    fn reading(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        Ok(Some(Value::from(21.5)))
    }
}

/// Shared handler instances plus a registry that hands them out.
pub struct Harness {
    pub map: Arc<MapHandler>,
    pub thermostat: Arc<FixedDispatch<Thermostat>>,
    pub constructed: Arc<AtomicUsize>,
    pub registry: HandlerRegistry,
}

impl Harness {
    pub fn new() -> Self {
        let map = Arc::new(MapHandler::default());
        let thermostat = Arc::new(FixedDispatch::new(Thermostat::default()));
        let constructed = Arc::new(AtomicUsize::new(0));

        let mut registry = HandlerRegistry::default();
        {
            let map = Arc::clone(&map);
            let constructed = Arc::clone(&constructed);
            registry
                .register("map", move |_| {
                    constructed.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::clone(&map) as Arc<dyn SettingsHandler>)
                })
                .expect("fresh tag");
        }
        {
            let thermostat = Arc::clone(&thermostat);
            registry
                .register("thermostat", move |_| {
                    Ok(Arc::clone(&thermostat) as Arc<dyn SettingsHandler>)
                })
                .expect("fresh tag");
        }

        Self { map, thermostat, constructed, registry }
    }

    pub fn load(&self) -> Solutions {
        Solutions::from_json_str(DEFINITIONS, &self.registry).expect("definitions load")
    }
}
