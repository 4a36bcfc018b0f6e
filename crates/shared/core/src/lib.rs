//! Settings abstraction and dispatch engine.
//!
//! A caller reads or writes a named, logical setting without knowing which backend
//! stores it. Definitions are loaded into a tree of [`Solutions`] → [`Solution`] →
//! [`SettingGroup`] → [`Setting`]; every group is bound at load time to the
//! [`SettingsHandler`] registered for its `handlerType` tag.
//!
//! ## Loading
//! ```rust
//! use knob_core::prelude::*;
//!
//! #[derive(Debug)]
//! struct Echo;
//!
//! #[async_trait]
//! impl SettingsHandler for Echo {
//!     async fn get(
//!         &self,
//!         group: &SettingGroup,
//!         settings: &[Arc<Setting>],
//!     ) -> Result<Values, SettingsError> {
//!         let mut values = Values::new();
//!         for setting in settings {
//!             values.insert(Arc::clone(setting), Some(Value::from(group.path())));
//!         }
//!         Ok(values)
//!     }
//!
//!     async fn set(&self, _: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError> {
//!         let mut report = SetReport::new();
//!         values.ids().for_each(|id| report.applied(id));
//!         Ok(report)
//!     }
//! }
//!
//! # fn main() -> Result<(), SettingsError> {
//! let mut registry = HandlerRegistry::default();
//! registry.register("echo", |_| Ok(Arc::new(Echo) as Arc<dyn SettingsHandler>))?;
//!
//! let solutions = Solutions::from_json_str(
//!     r#"{ "demo": { "main": { "path": "here", "handlerType": "echo", "settings": { "a": {} } } } }"#,
//!     &registry,
//! )?;
//! let setting = solutions.get("demo").expect("loaded").get_setting("main", "a")?;
//! assert_eq!(setting.name(), "a");
//! # Ok(())
//! # }
//! ```
//!
//! ## Fixed handlers
//! See [`fixed`] for handlers whose settings are bound to methods with
//! `#[settings_handler]`.

mod cache;
mod capabilities;
pub mod definition;
mod error;
pub mod fixed;
mod group;
mod handler;
pub mod prelude;
mod registry;
mod setting;
mod solution;
mod value;
mod values;

pub use async_trait::async_trait;
pub use cache::HandlerCache;
pub use capabilities::Capabilities;
pub use definition::DefinitionDocument;
pub use error::{SettingsError, SettingsErrorExt};
pub use group::{HandlerKind, SettingGroup};
pub use handler::SettingsHandler;
pub use knob_derive::settings_handler;
pub use registry::HandlerRegistry;
pub use setting::Setting;
pub use solution::{Solution, Solutions};
pub use value::{DataType, Value};
pub use values::{Entry, SetReport, Values};
