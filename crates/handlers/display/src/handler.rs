use crate::backend::DisplayBackend;
use crate::mode::Resolution;
use knob_core::prelude::*;
use tracing::info;

/// Fixed handler for the primary display.
///
/// | id            | read                      | write                                |
/// |---------------|---------------------------|--------------------------------------|
/// | `zoom`        | percentage                | one of `zoom_levels`                 |
/// | `resolution`  | `"WxH"`                   | index into `resolutions`, or `"WxH"` |
/// | `resolutions` | list of `"WxH"`           | read-only                            |
#[derive(Debug)]
pub struct DisplayHandler {
    backend: Arc<dyn DisplayBackend>,
}

fn rejected(value: &Value, reason: &'static str) -> SettingsError {
    SettingsError::SetterRejectedValue {
        message: value.to_string().into(),
        context: Some(reason.into()),
    }
}

fn required(value: Option<Value>, id: &str) -> Result<Value, SettingsError> {
    value.ok_or_else(|| SettingsError::SetterRejectedValue {
        message: format!("`{id}` cannot be cleared").into(),
        context: None,
    })
}

#[knob_core::settings_handler]
impl DisplayHandler {
    #[getter("zoom")]
    fn zoom(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        Ok(Some(Value::from(self.backend.zoom()?)))
    }

    #[setter("zoom")]
    fn set_zoom(&self, _setting: &Setting, value: Option<Value>) -> Result<(), SettingsError> {
        let value = required(value, "zoom")?;
        let percent = value
            .as_u64()
            .and_then(|p| u32::try_from(p).ok())
            .ok_or_else(|| rejected(&value, "Zoom must be a whole percentage"))?;
        if !self.backend.zoom_levels()?.contains(&percent) {
            return Err(rejected(&value, "Zoom level is not offered by this display"));
        }
        self.backend.set_zoom(percent)?;
        info!(percent, "Display zoom applied");
        Ok(())
    }

    #[getter("resolution")]
    fn resolution(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        Ok(Some(Value::String(self.backend.resolution()?.to_string())))
    }

    #[setter("resolution")]
    fn set_resolution(
        &self,
        _setting: &Setting,
        value: Option<Value>,
    ) -> Result<(), SettingsError> {
        let value = required(value, "resolution")?;
        let resolution = self.pick_resolution(&value)?;
        self.backend.set_resolution(resolution)?;
        info!(%resolution, "Display resolution applied");
        Ok(())
    }

    #[getter("resolutions")]
    fn resolutions(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
        let modes = self.backend.resolutions()?;
        Ok(Some(Value::Array(modes.iter().map(|m| Value::String(m.to_string())).collect())))
    }
}

impl DisplayHandler {
    #[must_use]
    pub fn new(backend: Arc<dyn DisplayBackend>) -> Self {
        Self { backend }
    }

    /// Resolves a written value: an index into the available modes or a `WxH` string.
    fn pick_resolution(&self, value: &Value) -> Result<Resolution, SettingsError> {
        match value {
            Value::Number(number) => {
                let modes = self.backend.resolutions()?;
                number
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .and_then(|i| modes.get(i).copied())
                    .ok_or_else(|| rejected(value, "No display mode at this index"))
            },
            Value::String(text) => Ok(text.parse::<Resolution>()?),
            _ => Err(rejected(value, "Expected a mode index or `WxH`")),
        }
    }
}
