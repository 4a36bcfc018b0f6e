pub use crate::fixed::{FixedDispatch, FixedHandler};
pub use crate::{
    Capabilities, DataType, HandlerCache, HandlerKind, HandlerRegistry, SetReport, Setting,
    SettingGroup, SettingsError, SettingsErrorExt, SettingsHandler, Solution, Solutions, Value,
    Values, async_trait, settings_handler,
};
pub use std::sync::Arc;
