use knob_core::fixed::FixedHandler;
use knob_core::{Setting, SettingsError, Value};

#[derive(Debug)]
struct Clock;

#[knob_core::settings_handler]
impl Clock {
    #[getter("hour")]
    fn hour(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        Ok(Some(Value::from(12)))
    }

    #[setter("hour")]
    async fn set_hour(&self, _setting: &Setting, _value: Option<Value>) -> Result<(), SettingsError> {
        Ok(())
    }

    #[getter("zone")]
    async fn zone(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        Ok(None)
    }

    #[allow(dead_code)]
    fn unrelated(&self) -> u8 {
        1
    }
}

fn main() {
    let bindings = Clock::bindings();
    assert!(bindings.getter("hour").is_some());
    assert!(bindings.setter("hour").is_some());
    assert!(bindings.getter("zone").is_some());
    assert!(bindings.setter("zone").is_none());
    assert!(bindings.getter("minute").is_none());
    assert_eq!(bindings.handler(), "Clock");
}
