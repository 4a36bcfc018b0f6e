pub mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use knob_core::prelude::*;
    use knob_process::{ProcessBackend, ProcessConfig};
    use serde_json::json;
    use std::time::Duration;

    fn load(backend: Arc<FakeProcesses>) -> Solutions {
        let backend: Arc<dyn ProcessBackend> = backend;
        let mut registry = HandlerRegistry::new(Capabilities::new().with(backend));
        knob_process::register(&mut registry, ProcessConfig::default()).unwrap();
        let definitions = json!({
            "desktop": {
                "tool": {
                    "path": TOOL,
                    "handlerType": "process",
                    "settings": { "isRunning": { "dataType": "boolean" } }
                }
            }
        });
        Solutions::from_json_str(&definitions.to_string(), &registry).unwrap()
    }

    fn running(solutions: &Solutions) -> Arc<Setting> {
        solutions.get("desktop").unwrap().get_setting("tool", "isRunning").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_launches_once() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());
        let setting = running(&solutions);

        assert_eq!(setting.get_value().await.unwrap(), Some(json!(false)));
        assert!(setting.set_value(Some(json!(true))).await.unwrap());
        assert!(setting.set_value(Some(json!("true"))).await.unwrap());
        assert_eq!(setting.get_value().await.unwrap(), Some(json!(true)));

        assert_eq!(backend.events(), vec![Event::Spawned(1001)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooperative_stop_does_not_kill() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());
        let setting = running(&solutions);
        setting.set_value(Some(json!(true))).await.unwrap();

        let started = tokio::time::Instant::now();
        assert!(setting.set_value(Some(json!(false))).await.unwrap());

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(backend.events(), vec![Event::Spawned(1001), Event::CloseRequested(1001)]);
        assert_eq!(setting.get_value().await.unwrap(), Some(json!(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stubborn_process_tree_is_killed_after_grace_period() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());
        let setting = running(&solutions);

        backend.stubborn_next();
        setting.set_value(Some(json!(true))).await.unwrap();
        let helper = backend.spawn_child(1001, "C:\\app\\helper.exe");

        let started = tokio::time::Instant::now();
        assert!(setting.set_value(Some(json!(false))).await.unwrap());

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(!backend.alive(1001));
        assert!(!backend.alive(helper));
        assert!(backend.events().contains(&Event::CloseRequested(1001)));
        assert!(backend.events().ends_with(&[Event::Killed(1001), Event::Killed(helper)]));
        assert_eq!(setting.get_value().await.unwrap(), Some(json!(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_kill_does_not_spare_other_survivors() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());
        let group = solutions.get("desktop").unwrap().get_group("tool").unwrap();
        let setting = group.setting("isRunning").unwrap().clone();

        backend.stubborn_next();
        let first = backend.spawn(TOOL).unwrap();
        backend.stubborn_next();
        let second = backend.spawn(TOOL).unwrap();
        backend.fail_kill(first);

        let report = group.apply(&Values::new().with(setting, Some(json!(false)))).await.unwrap();

        assert!(matches!(
            report.failure("isRunning"),
            Some(SettingsError::BackendOperation { .. })
        ));
        assert!(backend.alive(first));
        assert!(!backend.alive(second));
        assert!(backend.events().ends_with(&[Event::Killed(second)]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_not_running_is_a_no_op() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());

        assert!(running(&solutions).set_value(Some(json!(false))).await.unwrap());
        assert!(backend.events().is_empty());
    }

    #[tokio::test]
    async fn test_non_boolean_value_is_rejected() {
        let backend = Arc::new(FakeProcesses::default());
        let solutions = load(backend.clone());
        let group = solutions.get("desktop").unwrap().get_group("tool").unwrap();
        let setting = group.setting("isRunning").unwrap().clone();

        let report = group.apply(&Values::new().with(setting, Some(json!(7)))).await.unwrap();

        assert!(matches!(
            report.failure("isRunning"),
            Some(SettingsError::SetterRejectedValue { .. })
        ));
        assert!(backend.events().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_setting_has_no_binding() {
        let backend: Arc<dyn ProcessBackend> = Arc::new(FakeProcesses::default());
        let mut registry = HandlerRegistry::new(Capabilities::new().with(backend));
        knob_process::register(&mut registry, ProcessConfig::default()).unwrap();
        let definitions = json!({
            "desktop": {
                "tool": {
                    "path": TOOL,
                    "handlerType": "process",
                    "settings": { "pid": {} }
                }
            }
        });
        let solutions = Solutions::from_json_str(&definitions.to_string(), &registry).unwrap();
        let pid = solutions.get("desktop").unwrap().get_setting("tool", "pid").unwrap();

        let err = pid.get_value().await.unwrap_err();
        assert!(matches!(err, SettingsError::NoBindingForSetting { .. }));
    }

    #[test]
    fn test_config_defaults() {
        let config: ProcessConfig = serde_json::from_value(json!({ "poll_interval_ms": 0 })).unwrap();
        assert_eq!(config.grace_period(), Duration::from_secs(2));
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
