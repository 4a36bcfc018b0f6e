use crate::error::SettingsError;
use crate::handler::SettingsHandler;
use crate::setting::Setting;
use crate::solution::Solution;
use crate::values::{SetReport, Values};
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Handler type of a [`SettingGroup`], as named by its `handlerType` tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Registry,
    Display,
    Process,
    SystemSettings,
    /// Any handler registered outside the built-in slices.
    Custom(Cow<'static, str>),
}

impl HandlerKind {
    pub const REGISTRY: &'static str = "registry";
    pub const DISPLAY: &'static str = "display";
    pub const PROCESS: &'static str = "process";
    pub const SYSTEM_SETTINGS: &'static str = "systemSettings";

    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            Self::REGISTRY => Self::Registry,
            Self::DISPLAY => Self::Display,
            Self::PROCESS => Self::Process,
            Self::SYSTEM_SETTINGS => Self::SystemSettings,
            other => Self::Custom(Cow::Owned(other.to_owned())),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Registry => Self::REGISTRY,
            Self::Display => Self::DISPLAY,
            Self::Process => Self::PROCESS,
            Self::SystemSettings => Self::SYSTEM_SETTINGS,
            Self::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A collection of settings that share one physical location and one handler.
///
/// Groups are only ever constructed fully resolved, as part of a [`Solution`].
pub struct SettingGroup {
    id: String,
    path: String,
    kind: HandlerKind,
    handler: Arc<dyn SettingsHandler>,
    settings: Vec<Arc<Setting>>,
    index: FxHashMap<String, usize>,
    solution: Weak<Solution>,
}

impl fmt::Debug for SettingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingGroup")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("settings", &self.settings.iter().map(|s| s.id()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Resolved, validated input for one setting, ready to be wired into a group.
pub(crate) struct SettingPlan {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) data_type: Option<crate::value::DataType>,
}

/// Resolved, validated input for one group.
pub(crate) struct GroupPlan {
    pub(crate) id: String,
    pub(crate) path: String,
    pub(crate) kind: HandlerKind,
    pub(crate) handler: Arc<dyn SettingsHandler>,
    pub(crate) settings: Vec<SettingPlan>,
}

impl SettingGroup {
    /// Wires a group plan and its settings together.
    ///
    /// Infallible: every check already happened while the plan was built.
    pub(crate) fn build(plan: GroupPlan, solution: Weak<Solution>) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<Self>| {
            let mut index = FxHashMap::default();
            let settings = plan
                .settings
                .into_iter()
                .enumerate()
                .map(|(position, s)| {
                    index.insert(s.id.clone(), position);
                    Arc::new(Setting::new(s.id, s.name, s.data_type, me.clone()))
                })
                .collect();

            Self {
                id: plan.id,
                path: plan.path,
                kind: plan.kind,
                handler: plan.handler,
                settings,
                index,
                solution,
            }
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Physical location of the group's settings, interpreted by the handler.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn SettingsHandler> {
        &self.handler
    }

    /// Settings in declaration order.
    #[must_use]
    pub fn settings(&self) -> &[Arc<Setting>] {
        &self.settings
    }

    #[must_use]
    pub fn setting(&self, id: &str) -> Option<&Arc<Setting>> {
        self.index.get(id).map(|&i| &self.settings[i])
    }

    /// Upgrades the back-reference to the owning solution.
    ///
    /// # Errors
    /// Returns [`SettingsError::Detached`] once the solution has been dropped.
    pub fn solution(&self) -> Result<Arc<Solution>, SettingsError> {
        self.solution.upgrade().ok_or_else(|| SettingsError::Detached {
            message: self.id.clone().into(),
            context: Some("Owning solution is no longer loaded".into()),
        })
    }

    /// Reads `settings` through the handler.
    ///
    /// The result holds exactly one entry per requested setting, in request order;
    /// entries the handler left out are reported as [`SettingsError::NotFound`].
    ///
    /// # Errors
    /// Returns a batch-level failure reported by the handler.
    pub async fn get(&self, settings: &[Arc<Setting>]) -> Result<Values, SettingsError> {
        debug!(group = %self.id, handler = %self.kind, count = settings.len(), "Reading settings");
        let values = self.handler.get(self, settings).await?;
        Ok(values.conform(settings, &self.id))
    }

    /// Reads every declared setting of the group.
    ///
    /// # Errors
    /// Returns a batch-level failure reported by the handler.
    pub async fn get_all(&self) -> Result<Values, SettingsError> {
        self.get(&self.settings).await
    }

    /// Applies `values` and returns the per-entry report.
    ///
    /// # Errors
    /// Returns a batch-level failure reported by the handler.
    pub async fn apply(&self, values: &Values) -> Result<SetReport, SettingsError> {
        debug!(group = %self.id, handler = %self.kind, count = values.len(), "Writing settings");
        self.handler.set(self, values).await
    }

    /// Applies `values`; `Ok(false)` when at least one entry failed.
    ///
    /// Per-entry failures are logged and discarded; use [`SettingGroup::apply`] to
    /// inspect them.
    ///
    /// # Errors
    /// Returns a batch-level failure reported by the handler.
    pub async fn set(&self, values: &Values) -> Result<bool, SettingsError> {
        let report = self.apply(values).await?;
        for (setting, err) in report.failures() {
            warn!(group = %self.id, setting = %setting, error = %err, "Setting was not applied");
        }
        Ok(report.is_success())
    }
}
