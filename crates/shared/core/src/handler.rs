use crate::error::SettingsError;
use crate::group::SettingGroup;
use crate::setting::Setting;
use crate::values::{SetReport, Values};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Dispatch contract between setting groups and a concrete backend.
///
/// Both operations work on a whole batch so handlers can amortize an expensive backend
/// connection across entries.
///
/// # Contract
///
/// * `get` yields one entry per requested setting. A missing value is `None`; a failure
///   that concerns one setting is recorded with [`Values::fail`]. Only a failure of the
///   backend as a whole is returned as `Err`.
/// * `set` applies every assignment independently and records per-entry failures in the
///   returned [`SetReport`]. It is not transactional across entries.
/// * Handlers hold no per-call state, apart from private caches.
#[async_trait]
pub trait SettingsHandler: Debug + Send + Sync {
    /// Reads the current values of `settings`, all belonging to `group`.
    async fn get(
        &self,
        group: &SettingGroup,
        settings: &[Arc<Setting>],
    ) -> Result<Values, SettingsError>;

    /// Applies `values` to `group`'s backend.
    async fn set(&self, group: &SettingGroup, values: &Values) -> Result<SetReport, SettingsError>;
}
