use crate::backend::{KeyPath, RegistryBackend};
use crate::error::{RegistryError, RegistryErrorExt};
use crate::memory::{self, MemoryRegistry};
use async_trait::async_trait;
use knob_core::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

const TMP_SUFFIX: &str = "knobtmp";

/// A [`MemoryRegistry`] persisted as one JSON document.
///
/// Every write saves the whole store atomically: the document is written to a
/// temporary file next to the target, synced, and renamed over it. The in-memory store
/// only takes the change once the save succeeded.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
    memory: MemoryRegistry,
    save: Mutex<()>,
}

impl FileRegistry {
    /// Loads the store at `path`, or starts an empty one if the file does not exist yet.
    ///
    /// # Errors
    /// Returns [`RegistryError::Io`] if the file exists but cannot be read, or
    /// [`RegistryError::Json`] if its content is not a store snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let memory = match fs::read_to_string(&path).await {
            Ok(text) => MemoryRegistry::from_snapshot(&text)
                .context(format!("Loading {}", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => MemoryRegistry::new(),
            Err(err) => {
                return Err(RegistryError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };
        debug!(path = %path.display(), "Opened file registry");
        Ok(Self { path, memory, save: Mutex::new(()) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, document: &str) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.path.with_extension(TMP_SUFFIX);
        {
            let mut file = fs::File::create(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(document.as_bytes()).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        fs::rename(&temp, &self.path).await.context(format!(
            "Atomic swap failed: {} -> {}",
            temp.display(),
            self.path.display()
        ))?;

        debug!(path = %self.path.display(), "Registry saved atomically");
        Ok(())
    }
}

#[async_trait]
impl RegistryBackend for FileRegistry {
    async fn open(&self, path: &KeyPath) -> Result<(), RegistryError> {
        self.memory.open(path).await
    }

    async fn read(&self, path: &KeyPath, name: &str) -> Result<Option<Value>, RegistryError> {
        self.memory.read(path, name).await
    }

    async fn write(
        &self,
        path: &KeyPath,
        name: &str,
        value: Option<&Value>,
    ) -> Result<(), RegistryError> {
        let _guard = self.save.lock().await;
        let tree = self.memory.staged(path, name, value)?;
        self.persist(&memory::render(&tree)?).await?;
        self.memory.commit(tree);
        Ok(())
    }

    async fn snapshot(&self) -> Result<String, RegistryError> {
        self.memory.snapshot().await
    }
}
