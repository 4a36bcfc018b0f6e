//! Serialized shape of a solutions definition.
//!
//! ```json
//! {
//!   "notepad": {
//!     "editor": {
//!       "path": "HKEY_CURRENT_USER\\Software\\Notepad",
//!       "handlerType": "registry",
//!       "settings": { "fontSize": { "name": "Font size", "dataType": "integer" } }
//!     }
//!   }
//! }
//! ```
//!
//! Maps keep their declaration order and are read without collapsing repeated keys, so
//! the loader can report duplicates instead of silently keeping the last one.

use crate::error::SettingsError;
use crate::value::DataType;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Ordered key/value pairs as written in the source, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<V>(Vec<(String, V)>);

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Entries<V> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> FromIterator<(String, V)> for Entries<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> IntoIterator for Entries<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

struct EntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
    type Value = Entries<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by identifier")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(Entries(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_type: Option<DataType>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupDefinition {
    #[serde(default)]
    pub path: String,
    pub handler_type: String,
    #[serde(default)]
    pub settings: Entries<SettingDefinition>,
}

/// A parsed definition document: solution id → group id → group.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct DefinitionDocument(pub Entries<Entries<GroupDefinition>>);

fn malformed(err: impl fmt::Display, source: &'static str) -> SettingsError {
    SettingsError::MalformedDefinition { message: err.to_string().into(), context: Some(source.into()) }
}

impl DefinitionDocument {
    /// # Errors
    /// Returns [`SettingsError::MalformedDefinition`] if `input` is not a valid document.
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(input).map_err(|e| malformed(e, "JSON definition"))
    }

    /// # Errors
    /// Returns [`SettingsError::MalformedDefinition`] if `input` is not a valid document.
    pub fn from_toml(input: &str) -> Result<Self, SettingsError> {
        toml::from_str(input).map_err(|e| malformed(e, "TOML definition"))
    }

    /// # Errors
    /// Returns [`SettingsError::MalformedDefinition`] if `value` is not a valid document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SettingsError> {
        serde_json::from_value(value).map_err(|e| malformed(e, "JSON value"))
    }

    /// Reads a document from disk; `.toml` files are parsed as TOML, anything else as JSON.
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] if the file cannot be read, or
    /// [`SettingsError::MalformedDefinition`] if it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            source,
            context: Some(format!("Reading {}", path.display()).into()),
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml { Self::from_toml(&input) } else { Self::from_json(&input) }
    }

    pub fn solutions(&self) -> impl Iterator<Item = (&str, &Entries<GroupDefinition>)> {
        self.0.iter()
    }
}
