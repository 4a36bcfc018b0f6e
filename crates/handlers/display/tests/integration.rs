#[cfg(test)]
mod tests {
    use knob_core::prelude::*;
    use knob_display::{DisplayBackend, DisplayError, Resolution, VirtualDisplay};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Accepts any zoom it is given, whatever levels it advertises.
    #[derive(Debug)]
    struct LenientDisplay {
        zoom: AtomicU32,
        levels: Vec<u32>,
    }

    impl DisplayBackend for LenientDisplay {
        fn zoom(&self) -> Result<u32, DisplayError> {
            Ok(self.zoom.load(Ordering::SeqCst))
        }

        fn zoom_levels(&self) -> Result<Vec<u32>, DisplayError> {
            Ok(self.levels.clone())
        }

        fn set_zoom(&self, percent: u32) -> Result<(), DisplayError> {
            self.zoom.store(percent, Ordering::SeqCst);
            Ok(())
        }

        fn resolution(&self) -> Result<Resolution, DisplayError> {
            Ok(Resolution::new(800, 600))
        }

        fn resolutions(&self) -> Result<Vec<Resolution>, DisplayError> {
            Ok(vec![Resolution::new(800, 600)])
        }

        fn set_resolution(&self, _resolution: Resolution) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    fn load(backend: Arc<dyn DisplayBackend>) -> Solutions {
        let mut registry = HandlerRegistry::new(Capabilities::new().with(backend));
        knob_display::register(&mut registry).unwrap();
        let definitions = json!({
            "desktop": {
                "screen": {
                    "handlerType": "display",
                    "settings": {
                        "zoom": { "name": "Zoom level", "dataType": "integer" },
                        "resolution": { "dataType": "string" },
                        "resolutions": { "dataType": "json" }
                    }
                }
            }
        });
        Solutions::from_json_str(&definitions.to_string(), &registry).unwrap()
    }

    fn group(solutions: &Solutions) -> Arc<SettingGroup> {
        solutions.get("desktop").unwrap().get_group("screen").unwrap()
    }

    #[tokio::test]
    async fn test_reads_current_state() {
        let solutions = load(Arc::new(VirtualDisplay::default()));
        let values = group(&solutions).get_all().await.unwrap();

        assert_eq!(values.value("zoom"), Some(&json!(100)));
        assert_eq!(values.value("resolution"), Some(&json!("1920x1080")));
        assert_eq!(
            values.value("resolutions"),
            Some(&json!(["1920x1080", "1600x900", "1366x768", "1280x720", "1024x768"]))
        );
    }

    #[tokio::test]
    async fn test_zoom_round_trip_and_rejection() {
        let display = Arc::new(VirtualDisplay::default());
        let solutions = load(display.clone());
        let zoom = solutions.get("desktop").unwrap().get_setting("screen", "zoom").unwrap();

        assert!(zoom.set_value(Some(json!(150))).await.unwrap());
        assert_eq!(zoom.get_value().await.unwrap(), Some(json!(150)));

        assert!(!zoom.set_value(Some(json!(110))).await.unwrap());
        assert!(!zoom.set_value(Some(json!("150"))).await.unwrap());
        assert!(!zoom.set_value(None).await.unwrap());
        assert_eq!(display.zoom().unwrap(), 150);
    }

    #[tokio::test]
    async fn test_zoom_outside_advertised_levels_never_reaches_backend() {
        let display = Arc::new(LenientDisplay { zoom: AtomicU32::new(100), levels: vec![100, 200] });
        let solutions = load(display.clone());
        let group = group(&solutions);
        let zoom = group.setting("zoom").unwrap().clone();

        let report = group.apply(&Values::new().with(zoom.clone(), Some(json!(150)))).await.unwrap();
        assert!(matches!(report.failure("zoom"), Some(SettingsError::SetterRejectedValue { .. })));
        assert_eq!(display.zoom().unwrap(), 100);

        assert!(zoom.set_value(Some(json!(200))).await.unwrap());
        assert_eq!(display.zoom().unwrap(), 200);
    }

    #[tokio::test]
    async fn test_resolution_accepts_index_or_text() {
        let display = Arc::new(VirtualDisplay::default());
        let solutions = load(display.clone());
        let resolution =
            solutions.get("desktop").unwrap().get_setting("screen", "resolution").unwrap();

        assert!(resolution.set_value(Some(json!(2))).await.unwrap());
        assert_eq!(display.resolution().unwrap(), Resolution::new(1366, 768));

        assert!(resolution.set_value(Some(json!("1280x720"))).await.unwrap());
        assert_eq!(resolution.get_value().await.unwrap(), Some(json!("1280x720")));

        assert!(!resolution.set_value(Some(json!(99))).await.unwrap());
        assert!(!resolution.set_value(Some(json!("640x480"))).await.unwrap());
        assert!(!resolution.set_value(Some(json!("wide"))).await.unwrap());
        assert_eq!(display.resolution().unwrap(), Resolution::new(1280, 720));
    }

    #[tokio::test]
    async fn test_mode_list_is_read_only() {
        let solutions = load(Arc::new(VirtualDisplay::default()));
        let group = group(&solutions);
        let modes = group.setting("resolutions").unwrap().clone();

        let report = group.apply(&Values::new().with(modes, Some(json!([])))).await.unwrap();
        assert!(matches!(
            report.failure("resolutions"),
            Some(SettingsError::NoBindingForSetting { .. })
        ));
    }

    #[tokio::test]
    async fn test_detached_display_fails_the_batch() {
        let display = Arc::new(VirtualDisplay::default());
        let solutions = load(display.clone());
        display.detach();

        let err = group(&solutions).get_all().await.unwrap_err();
        assert!(err.is_batch_fatal(), "{err}");
    }
}
