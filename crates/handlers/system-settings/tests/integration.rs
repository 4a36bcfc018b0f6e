#[cfg(test)]
mod tests {
    use knob_core::prelude::*;
    use knob_system_settings::{MemorySystemSettings, SystemSettingsProvider};
    use serde_json::json;

    fn load(provider: Arc<MemorySystemSettings>) -> Solutions {
        let provider: Arc<dyn SystemSettingsProvider> = provider;
        let mut registry = HandlerRegistry::new(Capabilities::new().with(provider));
        knob_system_settings::register(&mut registry).unwrap();
        let definitions = json!({
            "accessibility": {
                "pointer": {
                    "handlerType": "systemSettings",
                    "settings": {
                        "pointerSize": { "dataType": "integer" },
                        "highContrast": { "dataType": "boolean" },
                        "narratorVoice": {}
                    }
                }
            }
        });
        Solutions::from_json_str(&definitions.to_string(), &registry).unwrap()
    }

    fn provider() -> Arc<MemorySystemSettings> {
        Arc::new(
            MemorySystemSettings::new()
                .with("pointerSize", Some(json!(1)))
                .with("highContrast", Some(json!(false))),
        )
    }

    #[tokio::test]
    async fn test_items_are_opened_once() {
        let provider = provider();
        let solutions = load(provider.clone());
        let group = solutions.get("accessibility").unwrap().get_group("pointer").unwrap();
        let size = group.setting("pointerSize").unwrap().clone();

        assert_eq!(size.get_value().await.unwrap(), Some(json!(1)));
        assert!(size.set_value(Some(json!(3))).await.unwrap());
        assert_eq!(size.get_value().await.unwrap(), Some(json!(3)));
        group.get_all().await.unwrap();
        group.get_all().await.unwrap();

        assert_eq!(provider.opens(), 2);
        assert_eq!(provider.item("pointerSize").unwrap().value(), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_unknown_item_fails_its_entry_only() {
        let provider = provider();
        let solutions = load(provider.clone());
        let group = solutions.get("accessibility").unwrap().get_group("pointer").unwrap();

        let values = group.get_all().await.unwrap();
        assert_eq!(values.value("highContrast"), Some(&json!(false)));
        assert!(matches!(
            values.error("narratorVoice"),
            Some(SettingsError::BackendOperation { .. })
        ));

        provider.define("narratorVoice", Some(json!("Zira")));
        let values = group.get_all().await.unwrap();
        assert_eq!(values.value("narratorVoice"), Some(&json!("Zira")));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_rejected() {
        let provider = provider();
        let solutions = load(provider.clone());
        let contrast =
            solutions.get("accessibility").unwrap().get_setting("pointer", "highContrast").unwrap();

        assert!(!contrast.set_value(Some(json!("on"))).await.unwrap());
        assert!(contrast.set_value(Some(json!(true))).await.unwrap());
        assert_eq!(provider.item("highContrast").unwrap().value(), Some(json!(true)));
    }

    #[tokio::test]
    async fn test_offline_provider_fails_the_batch() {
        let provider = provider();
        let solutions = load(provider.clone());
        provider.set_offline(true);

        let group = solutions.get("accessibility").unwrap().get_group("pointer").unwrap();
        let err = group.get_all().await.unwrap_err();
        assert!(err.is_batch_fatal(), "{err}");
    }
}
