//! Fixed handlers: settings bound by id to getter/setter functions.
//!
//! A fixed handler serves a closed set of setting ids. Each id is bound to a getter and,
//! optionally, a setter. The binding table is built once per handler type, usually by
//! the [`settings_handler`](crate::settings_handler) attribute:
//!
//! ```rust
//! use knob_core::fixed::{FixedDispatch, FixedHandler};
//! use knob_core::{Setting, SettingsError, Value};
//!
//! #[derive(Debug, Default)]
//! struct Volume {
//!     level: parking_lot::Mutex<i64>,
//! }
//!
//! #[knob_core::settings_handler]
//! impl Volume {
//!     #[getter("level")]
//!     fn level(&self, _setting: &Setting) -> Result<Option<Value>, SettingsError> {
//!         Ok(Some(Value::from(*self.level.lock())))
//!     }
//!
//!     #[setter("level")]
//!     fn set_level(&self, _setting: &Setting, value: Option<Value>) -> Result<(), SettingsError> {
//!         let level = value.as_ref().and_then(Value::as_i64).ok_or_else(|| {
//!             SettingsError::SetterRejectedValue { message: "expected an integer".into(), context: None }
//!         })?;
//!         *self.level.lock() = level;
//!         Ok(())
//!     }
//! }
//!
//! assert!(Volume::bindings().setter("level").is_some());
//! let _handler = FixedDispatch::new(Volume::default()).into_shared();
//! ```

use crate::error::SettingsError;
use crate::group::SettingGroup;
use crate::handler::SettingsHandler;
use crate::setting::Setting;
use crate::value::Value;
use crate::values::{SetReport, Values};
use async_trait::async_trait;
use futures::future::BoxFuture;
use fxhash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Future returned by a bound getter or setter.
pub type BindingFuture<'a, T> = BoxFuture<'a, Result<T, SettingsError>>;

/// Reads one setting from handler `H`.
pub type Getter<H> = for<'a> fn(&'a H, &'a Setting) -> BindingFuture<'a, Option<Value>>;

/// Writes one setting through handler `H`.
pub type Setter<H> = for<'a> fn(&'a H, &'a Setting, Option<Value>) -> BindingFuture<'a, ()>;

/// The getter/setter pair bound to one setting id.
pub struct Binding<H> {
    getter: Getter<H>,
    setter: Option<Setter<H>>,
}

impl<H> Clone for Binding<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Binding<H> {}

impl<H> fmt::Debug for Binding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("read_only", &self.setter.is_none()).finish()
    }
}

/// Binding table of a fixed handler type.
///
/// At most one getter and one setter per setting id.
pub struct Bindings<H> {
    handler: &'static str,
    table: FxHashMap<&'static str, Binding<H>>,
}

impl<H> fmt::Debug for Bindings<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.table.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("Bindings").field("handler", &self.handler).field("ids", &ids).finish()
    }
}

impl<H> Bindings<H> {
    #[must_use]
    pub fn builder(handler: &'static str) -> BindingsBuilder<H> {
        BindingsBuilder { handler, getters: Vec::new(), setters: Vec::new() }
    }

    /// Name of the handler type, used in error messages.
    #[must_use]
    pub const fn handler(&self) -> &'static str {
        self.handler
    }

    #[must_use]
    pub fn getter(&self, id: &str) -> Option<Getter<H>> {
        self.table.get(id).map(|b| b.getter)
    }

    #[must_use]
    pub fn setter(&self, id: &str) -> Option<Setter<H>> {
        self.table.get(id).and_then(|b| b.setter)
    }

    #[must_use]
    pub fn binding(&self, id: &str) -> Option<Binding<H>> {
        self.table.get(id).copied()
    }

    /// Bound setting ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = self.table.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Collects bindings for [`Bindings`].
pub struct BindingsBuilder<H> {
    handler: &'static str,
    getters: Vec<(&'static str, Getter<H>)>,
    setters: Vec<(&'static str, Setter<H>)>,
}

impl<H> fmt::Debug for BindingsBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingsBuilder")
            .field("handler", &self.handler)
            .field("getters", &self.getters.len())
            .field("setters", &self.setters.len())
            .finish()
    }
}

impl<H> BindingsBuilder<H> {
    #[must_use]
    pub fn getter(mut self, id: &'static str, getter: Getter<H>) -> Self {
        self.getters.push((id, getter));
        self
    }

    #[must_use]
    pub fn setter(mut self, id: &'static str, setter: Setter<H>) -> Self {
        self.setters.push((id, setter));
        self
    }

    /// Binds a read/write pair in one call.
    #[must_use]
    pub fn bind(self, id: &'static str, getter: Getter<H>, setter: Setter<H>) -> Self {
        self.getter(id, getter).setter(id, setter)
    }

    /// Freezes the table.
    ///
    /// # Panics
    /// Panics if an id has two getters or two setters, or a setter without a getter.
    /// Tables are static per handler type, so these are programming errors.
    #[must_use]
    pub fn build(self) -> Bindings<H> {
        let mut table: FxHashMap<&'static str, Binding<H>> = FxHashMap::default();

        for (id, getter) in self.getters {
            let previous = table.insert(id, Binding { getter, setter: None });
            assert!(previous.is_none(), "{}: setting `{id}` has two getters", self.handler);
        }
        for (id, setter) in self.setters {
            let Some(binding) = table.get_mut(id) else {
                panic!("{}: setting `{id}` has a setter but no getter", self.handler);
            };
            assert!(binding.setter.is_none(), "{}: setting `{id}` has two setters", self.handler);
            binding.setter = Some(setter);
        }

        Bindings { handler: self.handler, table }
    }
}

/// A handler type that serves a static binding table.
///
/// Implemented by `#[settings_handler]`; wrap the value in [`FixedDispatch`] to use it
/// as a [`SettingsHandler`].
pub trait FixedHandler: fmt::Debug + Send + Sync + Sized + 'static {
    fn bindings() -> &'static Bindings<Self>;
}

/// Adapts a [`FixedHandler`] to the [`SettingsHandler`] contract.
#[derive(Debug)]
pub struct FixedDispatch<H> {
    inner: H,
}

impl<H: FixedHandler> FixedDispatch<H> {
    #[must_use]
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }

    #[must_use]
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    #[must_use]
    pub fn into_shared(self) -> Arc<dyn SettingsHandler> {
        Arc::new(self)
    }
}

fn no_binding(handler: &str, id: &str, context: &'static str) -> SettingsError {
    SettingsError::NoBindingForSetting {
        message: format!("{handler}.{id}").into(),
        context: Some(context.into()),
    }
}

#[async_trait]
impl<H: FixedHandler> SettingsHandler for FixedDispatch<H> {
    async fn get(
        &self,
        group: &SettingGroup,
        settings: &[Arc<Setting>],
    ) -> Result<Values, SettingsError> {
        let bindings = H::bindings();
        let mut values = Values::with_capacity(settings.len());

        for setting in settings {
            let Some(getter) = bindings.getter(setting.id()) else {
                warn!(group = group.id(), setting = setting.id(), "No getter bound");
                let err = no_binding(bindings.handler(), setting.id(), "No getter");
                values.fail(Arc::clone(setting), err);
                continue;
            };

            debug!(handler = bindings.handler(), setting = setting.id(), "Invoking getter");
            match getter(&self.inner, setting).await {
                Ok(value) => values.insert(Arc::clone(setting), value),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => {
                    warn!(group = group.id(), setting = setting.id(), error = %err, "Getter failed");
                    values.fail(Arc::clone(setting), err);
                },
            }
        }

        Ok(values)
    }

    async fn set(&self, group: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError> {
        let bindings = H::bindings();
        let mut report = SetReport::new();

        for (setting, value) in values.assignments() {
            let Some(binding) = bindings.binding(setting.id()) else {
                report.failed(setting.id(), no_binding(bindings.handler(), setting.id(), "No setter"));
                continue;
            };
            let Some(setter) = binding.setter else {
                report.failed(
                    setting.id(),
                    no_binding(bindings.handler(), setting.id(), "Setting is read-only"),
                );
                continue;
            };

            debug!(handler = bindings.handler(), setting = setting.id(), "Invoking setter");
            match setter(&self.inner, setting, value.clone()).await {
                Ok(()) => report.applied(setting.id()),
                Err(err) if err.is_batch_fatal() => return Err(err),
                Err(err) => {
                    warn!(group = group.id(), setting = setting.id(), error = %err, "Setter failed");
                    report.failed(setting.id(), err);
                },
            }
        }

        Ok(report)
    }
}
