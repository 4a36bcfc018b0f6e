#[cfg(test)]
mod tests {
    use knob_core::prelude::*;
    use knob_registry::{FileRegistry, MemoryRegistry, RegistryBackend};
    use serde_json::json;

    const KEY: &str = "HKEY_CURRENT_USER\\Software\\Knob\\Test";

    fn definitions(path: &str) -> String {
        json!({
            "knob": {
                "test": {
                    "path": path,
                    "handlerType": "registry",
                    "settings": {
                        "settingOne": { "dataType": "string" },
                        "settingTwo": { "dataType": "string" },
                        "settingThree": { "dataType": "integer" }
                    }
                }
            }
        })
        .to_string()
    }

    fn load(store: Arc<dyn RegistryBackend>, path: &str) -> Solutions {
        let mut registry = HandlerRegistry::new(Capabilities::new().with(store));
        knob_registry::register(&mut registry).unwrap();
        Solutions::from_json_str(&definitions(path), &registry).unwrap()
    }

    fn seeded() -> Arc<MemoryRegistry> {
        let store = MemoryRegistry::new()
            .seed(KEY, "settingOne", json!("abc"))
            .and_then(|s| s.seed(KEY, "settingTwo", json!("xyz")))
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_reads_seeded_values_without_mutating_the_store() {
        let store = seeded();
        let solutions = load(store.clone(), KEY);
        let solution = solutions.get("knob").unwrap();
        let before = store.snapshot().await.unwrap();

        let one = solution.get_setting("test", "settingOne").unwrap();
        let two = solution.get_setting("test", "settingTwo").unwrap();
        let three = solution.get_setting("test", "settingThree").unwrap();

        assert_eq!(one.get_value().await.unwrap(), Some(json!("abc")));
        assert_eq!(two.get_value().await.unwrap(), Some(json!("xyz")));
        assert_eq!(three.get_value().await.unwrap(), None);

        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_write_all_then_read_back() {
        let store = seeded();
        let solutions = load(store.clone(), KEY);
        let group = solutions.get("knob").unwrap().get_group("test").unwrap();

        let mut batch = Values::new();
        batch.insert(group.setting("settingOne").unwrap().clone(), Some(json!("one")));
        batch.insert(group.setting("settingTwo").unwrap().clone(), Some(json!("two")));
        batch.insert(group.setting("settingThree").unwrap().clone(), Some(json!(3)));
        assert!(group.set(&batch).await.unwrap());

        let values = group.get_all().await.unwrap();
        assert_eq!(values.value("settingOne"), Some(&json!("one")));
        assert_eq!(values.value("settingTwo"), Some(&json!("two")));
        assert_eq!(values.value("settingThree"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_write_changes_only_its_own_value() {
        let store = seeded();
        let solutions = load(store.clone(), KEY);
        let one = solutions.get("knob").unwrap().get_setting("test", "settingOne").unwrap();

        let before: serde_json::Value =
            serde_json::from_str(&store.snapshot().await.unwrap()).unwrap();
        one.set_value(Some(json!("changed"))).await.unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&store.snapshot().await.unwrap()).unwrap();

        let mut expected = before;
        expected["HKEY_CURRENT_USER"]["Software\\Knob\\Test"]["settingOne"] = json!("changed");
        assert_eq!(after, expected);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_rejected_per_entry() {
        let store = seeded();
        let solutions = load(store.clone(), KEY);
        let group = solutions.get("knob").unwrap().get_group("test").unwrap();

        let batch = Values::new()
            .with(group.setting("settingOne").unwrap().clone(), Some(json!(42)))
            .with(group.setting("settingThree").unwrap().clone(), Some(json!(7)));
        let report = group.apply(&batch).await.unwrap();

        assert!(matches!(
            report.failure("settingOne"),
            Some(SettingsError::SetterRejectedValue { .. })
        ));
        assert_eq!(report.applied_ids(), ["settingThree"]);
        let one = group.setting("settingOne").unwrap();
        assert_eq!(one.get_value().await.unwrap(), Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_missing_hive_fails_the_batch() {
        let store = Arc::new(MemoryRegistry::with_hives(["HKEY_CURRENT_USER"]));
        let solutions = load(store, "HKLM\\Software\\Knob");
        let group = solutions.get("knob").unwrap().get_group("test").unwrap();

        let err = group.get_all().await.unwrap_err();
        assert!(err.is_batch_fatal(), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_path_fails_the_batch() {
        let solutions = load(seeded(), "HKCU\\Software\\\\Knob");
        let group = solutions.get("knob").unwrap().get_group("test").unwrap();

        let err = group.get_all().await.unwrap_err();
        assert!(matches!(err, SettingsError::BackendUnavailable { .. }), "{err}");

        let one = group.setting("settingOne").unwrap();
        assert!(one.set_value(Some(json!("x"))).await.unwrap_err().is_batch_fatal());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_value_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = Arc::new(FileRegistry::open(nested.join("registry.json")).await.unwrap());
        let solutions = load(store.clone(), KEY);
        let one = solutions.get("knob").unwrap().get_setting("test", "settingOne").unwrap();
        assert!(one.set_value(Some(json!("saved"))).await.unwrap());

        std::fs::remove_dir_all(&nested).unwrap();
        std::fs::write(&nested, "").unwrap();

        let err = one.set_value(Some(json!("lost"))).await.unwrap_err();
        assert!(err.is_batch_fatal(), "{err}");
        assert_eq!(one.get_value().await.unwrap(), Some(json!("saved")));
    }

    #[tokio::test]
    async fn test_file_store_persists_handler_writes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("registry.json");

        {
            let store = Arc::new(FileRegistry::open(&file).await.unwrap());
            let solutions = load(store, KEY);
            let one = solutions.get("knob").unwrap().get_setting("test", "settingOne").unwrap();
            assert!(one.set_value(Some(json!("persisted"))).await.unwrap());
        }

        let store = Arc::new(FileRegistry::open(&file).await.unwrap());
        let solutions = load(store, KEY);
        let one = solutions.get("knob").unwrap().get_setting("test", "settingOne").unwrap();
        assert_eq!(one.get_value().await.unwrap(), Some(json!("persisted")));
    }

    #[test]
    fn test_missing_capability_fails_the_load() {
        let mut registry = HandlerRegistry::default();
        knob_registry::register(&mut registry).unwrap();

        let err = Solutions::from_json_str(&definitions(KEY), &registry).unwrap_err();
        assert!(matches!(err, SettingsError::BackendUnavailable { .. }));
    }
}
