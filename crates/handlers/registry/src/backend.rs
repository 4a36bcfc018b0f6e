use crate::error::RegistryError;
use async_trait::async_trait;
use knob_core::Value;
use std::fmt::Debug;

/// Root hives every store knows about, with their short aliases.
pub const HIVES: &[(&str, &str)] = &[
    ("HKEY_CLASSES_ROOT", "HKCR"),
    ("HKEY_CURRENT_USER", "HKCU"),
    ("HKEY_LOCAL_MACHINE", "HKLM"),
    ("HKEY_USERS", "HKU"),
    ("HKEY_CURRENT_CONFIG", "HKCC"),
];

/// A key path split into its root hive and the sub-key below it.
///
/// Both `\` and `/` separate segments; the canonical form uses `\`. Hive names are
/// matched case-insensitively and may be abbreviated (`HKCU`), sub-keys are kept as
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    hive: &'static str,
    key: String,
}

impl KeyPath {
    /// # Errors
    /// Returns [`RegistryError::InvalidPath`] for an empty path or empty segment, and
    /// [`RegistryError::HiveNotFound`] for an unknown root.
    pub fn parse(path: &str) -> Result<Self, RegistryError> {
        let normalized = path.trim().replace('/', "\\");
        let normalized = normalized.trim_matches('\\');
        let (root, key) = normalized.split_once('\\').unwrap_or((normalized, ""));

        if root.is_empty() {
            return Err(RegistryError::InvalidPath {
                message: path.to_owned().into(),
                context: Some("Key path is empty".into()),
            });
        }
        if key.split('\\').any(str::is_empty) && !key.is_empty() {
            return Err(RegistryError::InvalidPath {
                message: path.to_owned().into(),
                context: Some("Key path has an empty segment".into()),
            });
        }

        let hive = HIVES
            .iter()
            .find(|(name, alias)| {
                root.eq_ignore_ascii_case(name) || root.eq_ignore_ascii_case(alias)
            })
            .map(|(name, _)| *name)
            .ok_or_else(|| RegistryError::HiveNotFound {
                message: root.to_owned().into(),
                context: Some(path.to_owned().into()),
            })?;

        Ok(Self { hive, key: key.to_owned() })
    }

    #[must_use]
    pub const fn hive(&self) -> &'static str {
        self.hive
    }

    /// Sub-key below the hive; empty for the hive itself.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Hierarchical key/value store addressed by key path and value name.
///
/// Values are JSON values; `None` on write deletes the value. Reads never create keys.
#[async_trait]
pub trait RegistryBackend: Debug + Send + Sync {
    /// Checks that `path` is addressable, without creating anything.
    ///
    /// # Errors
    /// [`RegistryError::HiveNotFound`] when the root hive does not exist in this store.
    async fn open(&self, path: &KeyPath) -> Result<(), RegistryError>;

    /// # Errors
    /// A store-level failure; a missing key or value is `Ok(None)`.
    async fn read(&self, path: &KeyPath, name: &str) -> Result<Option<Value>, RegistryError>;

    /// Writes (`Some`) or deletes (`None`) one value, creating the key as needed.
    ///
    /// # Errors
    /// A store-level failure.
    async fn write(
        &self,
        path: &KeyPath,
        name: &str,
        value: Option<&Value>,
    ) -> Result<(), RegistryError>;

    /// Serialized state of the whole store; equal states produce identical text.
    ///
    /// # Errors
    /// A store-level failure.
    async fn snapshot(&self) -> Result<String, RegistryError>;
}
