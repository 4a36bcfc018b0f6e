use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Memoizes per-id objects that are expensive to construct or stateful.
///
/// Entries are created lazily on first access and kept for the lifetime of the cache;
/// there is no eviction. Concurrent first access to the same id constructs exactly one
/// object, and every caller receives that object.
pub struct HandlerCache<T: ?Sized> {
    entries: RwLock<FxHashMap<String, Arc<T>>>,
}

impl<T: ?Sized> Default for HandlerCache<T> {
    fn default() -> Self {
        Self { entries: RwLock::new(FxHashMap::default()) }
    }
}

impl<T: ?Sized> fmt::Debug for HandlerCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut ids: Vec<&str> = entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("HandlerCache").field("ids", &ids).finish()
    }
}

impl<T: ?Sized> HandlerCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached object for `id` without constructing it.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<T>> {
        self.entries.read().get(id).cloned()
    }

    /// Returns the cached object for `id`, constructing it with `init` on first access.
    pub fn get_or_insert_with(&self, id: &str, init: impl FnOnce() -> Arc<T>) -> Arc<T> {
        match self.try_get_or_insert_with(id, || Ok::<_, std::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`HandlerCache::get_or_insert_with`].
    ///
    /// Construction happens under the write lock, so racing callers never build a
    /// second instance. A failed construction caches nothing.
    ///
    /// # Errors
    /// Propagates the error returned by `init`.
    pub fn try_get_or_insert_with<E>(
        &self,
        id: &str,
        init: impl FnOnce() -> Result<Arc<T>, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(existing) = self.get(id) {
            return Ok(existing);
        }

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(id) {
            return Ok(Arc::clone(existing));
        }

        trace!(id, "Constructing cached handler object");
        let value = init()?;
        entries.insert(id.to_owned(), Arc::clone(&value));
        drop(entries);
        Ok(value)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
