//! Batched values exchanged with settings handlers.

use crate::error::SettingsError;
use crate::setting::Setting;
use crate::value::Value;
use std::sync::Arc;
use tracing::warn;

/// One entry of a [`Values`] batch: a setting and either its value or the reason it failed.
#[derive(Debug)]
pub struct Entry {
    setting: Arc<Setting>,
    outcome: Result<Option<Value>, SettingsError>,
}

impl Entry {
    #[must_use]
    pub const fn setting(&self) -> &Arc<Setting> {
        &self.setting
    }

    /// The value (`Ok(None)` when absent) or the per-entry failure.
    ///
    /// # Errors
    /// Returns the error recorded for this entry.
    pub const fn value(&self) -> Result<&Option<Value>, &SettingsError> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Ordered mapping from [`Setting`] to an optional value.
///
/// Used as the unit of a batched get or set. Keys are unique by setting id; inserting
/// an id twice replaces the earlier entry in place. Get results may carry per-entry
/// failures next to regular values.
#[derive(Debug, Default)]
pub struct Values {
    entries: Vec<Entry>,
}

impl Values {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Builder-style [`Values::insert`].
    #[must_use]
    pub fn with(mut self, setting: Arc<Setting>, value: Option<Value>) -> Self {
        self.insert(setting, value);
        self
    }

    /// Records a value (or its absence) for `setting`.
    pub fn insert(&mut self, setting: Arc<Setting>, value: Option<Value>) {
        self.put(setting, Ok(value));
    }

    /// Records a per-entry failure for `setting`.
    pub fn fail(&mut self, setting: Arc<Setting>, error: SettingsError) {
        self.put(setting, Err(error));
    }

    fn put(&mut self, setting: Arc<Setting>, outcome: Result<Option<Value>, SettingsError>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.setting.id() == setting.id()) {
            entry.setting = setting;
            entry.outcome = outcome;
        } else {
            self.entries.push(Entry { setting, outcome });
        }
    }

    /// Returns the recorded value for `id`: `Some(&None)` if the value is absent,
    /// `None` if there is no successful entry for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Option<Value>> {
        self.entry(id).and_then(|e| e.outcome.as_ref().ok())
    }

    /// Flattened [`Values::get`]: the value itself, if present.
    #[must_use]
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.get(id).and_then(Option::as_ref)
    }

    /// The failure recorded for `id`, if any.
    #[must_use]
    pub fn error(&self, id: &str) -> Option<&SettingsError> {
        self.entry(id).and_then(|e| e.outcome.as_ref().err())
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.setting.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entry(id).is_some()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.setting.id())
    }

    /// Entries that carry a value to apply, skipping recorded failures.
    pub fn assignments(&self) -> impl Iterator<Item = (&Arc<Setting>, &Option<Value>)> {
        self.entries.iter().filter_map(|e| e.outcome.as_ref().ok().map(|v| (&e.setting, v)))
    }

    /// Consumes the batch and returns the outcome recorded for `id`.
    ///
    /// # Errors
    /// Returns the per-entry failure, or [`SettingsError::NotFound`] if no entry exists.
    pub fn into_single(self, id: &str) -> Result<Option<Value>, SettingsError> {
        self.entries
            .into_iter()
            .find(|e| e.setting.id() == id)
            .ok_or_else(|| SettingsError::NotFound {
                message: format!("setting `{id}`").into(),
                context: Some("Handler returned no entry".into()),
            })?
            .outcome
    }

    /// Reorders the batch to match `requested`, keeping exactly one entry per request.
    ///
    /// Missing entries become [`SettingsError::NotFound`] failures; entries nobody asked
    /// for are dropped.
    pub(crate) fn conform(mut self, requested: &[Arc<Setting>], group: &str) -> Self {
        let mut ordered = Vec::with_capacity(requested.len());
        for setting in requested {
            let position = self.entries.iter().position(|e| e.setting.id() == setting.id());
            let entry = position.map_or_else(
                || Entry {
                    setting: Arc::clone(setting),
                    outcome: Err(SettingsError::NotFound {
                        message: format!("setting `{}`", setting.id()).into(),
                        context: Some("Handler returned no entry".into()),
                    }),
                },
                |i| self.entries.swap_remove(i),
            );
            ordered.push(entry);
        }
        for extra in &self.entries {
            warn!(group, setting = extra.setting.id(), "Dropping unrequested entry from handler");
        }
        Self { entries: ordered }
    }
}

impl<'a> IntoIterator for &'a Values {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Per-entry outcome of a batched set.
///
/// Handlers apply entries one at a time; a failure of one entry does not roll back the
/// others.
#[derive(Debug, Default)]
pub struct SetReport {
    applied: Vec<String>,
    failures: Vec<(String, SettingsError)>,
}

impl SetReport {
    #[must_use]
    pub const fn new() -> Self {
        Self { applied: Vec::new(), failures: Vec::new() }
    }

    pub fn applied(&mut self, id: impl Into<String>) {
        self.applied.push(id.into());
    }

    pub fn failed(&mut self, id: impl Into<String>, error: SettingsError) {
        self.failures.push((id.into(), error));
    }

    /// `true` when no entry failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn applied_ids(&self) -> &[String] {
        &self.applied
    }

    #[must_use]
    pub fn failures(&self) -> &[(String, SettingsError)] {
        &self.failures
    }

    #[must_use]
    pub fn failure(&self, id: &str) -> Option<&SettingsError> {
        self.failures.iter().find(|(failed, _)| failed == id).map(|(_, err)| err)
    }
}
