use crate::backend::{HIVES, KeyPath, RegistryBackend};
use crate::error::RegistryError;
use async_trait::async_trait;
use knob_core::Value;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Values of one key, by name.
pub type KeyValues = BTreeMap<String, Value>;

/// Whole store: hive → sub-key → value name → value.
///
/// Ordered maps keep snapshots deterministic.
pub type Tree = BTreeMap<String, BTreeMap<String, KeyValues>>;

/// Registry store held entirely in memory.
#[derive(Debug)]
pub struct MemoryRegistry {
    tree: RwLock<Tree>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::with_hives(HIVES.iter().map(|(name, _)| *name))
    }
}

impl MemoryRegistry {
    /// A store with every standard hive and no keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with only the given root hives; paths under any other hive are unavailable.
    #[must_use]
    pub fn with_hives<'a>(hives: impl IntoIterator<Item = &'a str>) -> Self {
        let tree = hives.into_iter().map(|hive| (hive.to_owned(), BTreeMap::new())).collect();
        Self { tree: RwLock::new(tree) }
    }

    /// Restores a store from [`RegistryBackend::snapshot`] output.
    ///
    /// # Errors
    /// Returns [`RegistryError::Json`] if `snapshot` is not a serialized tree.
    pub fn from_snapshot(snapshot: &str) -> Result<Self, RegistryError> {
        let tree: Tree = serde_json::from_str(snapshot)?;
        Ok(Self { tree: RwLock::new(tree) })
    }

    /// Sets a value directly, for seeding a store.
    ///
    /// # Errors
    /// Returns an error if `path` does not parse or names a hive this store lacks.
    pub fn insert(&self, path: &str, name: &str, value: Value) -> Result<(), RegistryError> {
        let path = KeyPath::parse(path)?;
        self.store(&path, name, Some(&value))
    }

    /// Builder-style [`MemoryRegistry::insert`].
    ///
    /// # Errors
    /// See [`MemoryRegistry::insert`].
    pub fn seed(self, path: &str, name: &str, value: Value) -> Result<Self, RegistryError> {
        self.insert(path, name, value)?;
        Ok(self)
    }

    pub(crate) fn store(
        &self,
        path: &KeyPath,
        name: &str,
        value: Option<&Value>,
    ) -> Result<(), RegistryError> {
        apply(&mut self.tree.write(), path, name, value)
    }

    /// A copy of the store with one change applied; the store itself is untouched.
    pub(crate) fn staged(
        &self,
        path: &KeyPath,
        name: &str,
        value: Option<&Value>,
    ) -> Result<Tree, RegistryError> {
        let mut tree = self.tree.read().clone();
        apply(&mut tree, path, name, value)?;
        Ok(tree)
    }

    /// Replaces the whole store, typically with a [`MemoryRegistry::staged`] tree.
    pub(crate) fn commit(&self, tree: Tree) {
        *self.tree.write() = tree;
    }

    pub(crate) fn render(&self) -> Result<String, RegistryError> {
        render(&self.tree.read())
    }

    fn lookup(&self, path: &KeyPath, name: &str) -> Result<Option<Value>, RegistryError> {
        let tree = self.tree.read();
        let hive = tree.get(path.hive()).ok_or_else(|| hive_not_found(path))?;
        Ok(hive.get(path.key()).and_then(|values| values.get(name)).cloned())
    }

    fn has_hive(&self, path: &KeyPath) -> Result<(), RegistryError> {
        if self.tree.read().contains_key(path.hive()) { Ok(()) } else { Err(hive_not_found(path)) }
    }
}

fn apply(
    tree: &mut Tree,
    path: &KeyPath,
    name: &str,
    value: Option<&Value>,
) -> Result<(), RegistryError> {
    let hive = tree.get_mut(path.hive()).ok_or_else(|| hive_not_found(path))?;
    match value {
        Some(value) => {
            hive.entry(path.key().to_owned()).or_default().insert(name.to_owned(), value.clone());
        },
        None => {
            if let Some(values) = hive.get_mut(path.key()) {
                values.remove(name);
            }
        },
    }
    Ok(())
}

pub(crate) fn render(tree: &Tree) -> Result<String, RegistryError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

fn hive_not_found(path: &KeyPath) -> RegistryError {
    RegistryError::HiveNotFound {
        message: path.hive().into(),
        context: Some("Hive is not present in this store".into()),
    }
}

#[async_trait]
impl RegistryBackend for MemoryRegistry {
    async fn open(&self, path: &KeyPath) -> Result<(), RegistryError> {
        self.has_hive(path)
    }

    async fn read(&self, path: &KeyPath, name: &str) -> Result<Option<Value>, RegistryError> {
        self.lookup(path, name)
    }

    async fn write(
        &self,
        path: &KeyPath,
        name: &str,
        value: Option<&Value>,
    ) -> Result<(), RegistryError> {
        self.store(path, name, value)
    }

    async fn snapshot(&self) -> Result<String, RegistryError> {
        self.render()
    }
}
