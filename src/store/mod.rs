//! File-backed JSON stores
//!
//! Each store is a single JSON document on disk. Reads load the whole file,
//! writes rewrite it through a temporary file that is renamed over the
//! previous one, so a crash mid-write never leaves a truncated store behind.

pub mod cases;
pub mod roles;

pub use cases::{CaseCounter, CaseKey};
pub use roles::ConfigStore;

use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Errors raised while reading or writing a store file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A JSON document on disk with a writer lock.
///
/// The lock is held across the full read-modify-write of [`JsonFile::update`].
/// Plain loads don't take it: the rename in `write` means a reader sees either
/// the old document or the new one.
pub struct JsonFile<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for JsonFile<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFile").field("path", &self.path).finish()
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Load the document. A missing or empty file reads as `T::default()`.
    pub async fn load(&self) -> StoreResult<T> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store file {} not found, starting empty", self.path.display());
                return Ok(T::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Apply `f` to the stored document and persist the result.
    ///
    /// Nothing is written if the current file can't be read or parsed.
    pub async fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> StoreResult<R> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let result = f(&mut document);
        self.write(&document).await?;
        Ok(result)
    }

    async fn write(&self, document: &T) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(document)?;

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;

        let tmp_path = self.temp_path();
        if let Err(e) = write_synced(&tmp_path, &bytes).await {
            discard(&tmp_path).await;
            return Err(StoreError::io(&tmp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            discard(&tmp_path).await;
            return Err(StoreError::io(&self.path, e));
        }

        // The rename is only durable once the directory entry is on disk
        sync_dir(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "store".into(), |name| name.to_string_lossy());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()))
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

// Directories can't be opened as files here
#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temporary file {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TempDir;
    use std::collections::BTreeMap;

    type Counts = BTreeMap<String, u64>;

    #[tokio::test]
    async fn test_missing_file_loads_default() {
        let dir = TempDir::new();
        let file: JsonFile<Counts> = JsonFile::new(dir.path().join("absent.json"));
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_file_loads_default() {
        let dir = TempDir::new();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "  \n").unwrap();

        let file: JsonFile<Counts> = JsonFile::new(path);
        assert!(file.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_creates_parent_dirs_and_leaves_no_temp_files() {
        let dir = TempDir::new();
        let path = dir.path().join("nested").join("counts.json");
        let file: JsonFile<Counts> = JsonFile::new(&path);

        file.update(|doc| doc.insert("a".to_string(), 1)).await.unwrap();

        let on_disk: Counts = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("a"), Some(&1));

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_updates_accumulate() {
        let dir = TempDir::new();
        let file: JsonFile<Counts> = JsonFile::new(dir.path().join("counts.json"));
        file.update(|doc| doc.insert("a".to_string(), 2)).await.unwrap();
        file.update(|doc| doc.insert("b".to_string(), 3)).await.unwrap();

        let loaded = file.load().await.unwrap();
        assert_eq!(loaded.get("a"), Some(&2));
        assert_eq!(loaded.get("b"), Some(&3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sync_dir_on_store_directory() {
        let dir = TempDir::new();
        sync_dir(dir.path()).await.unwrap();
        assert!(sync_dir(&dir.path().join("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_refuses_to_overwrite_corrupt_file() {
        let dir = TempDir::new();
        let path = dir.path().join("counts.json");
        std::fs::write(&path, "{ not json").unwrap();

        let file: JsonFile<Counts> = JsonFile::new(&path);
        let result = file.update(|doc| doc.insert("a".to_string(), 1)).await;

        assert!(matches!(result, Err(StoreError::Parse { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up_temp_file() {
        let dir = TempDir::new();
        // A directory in place of the store file makes the final rename fail.
        let path = dir.path().join("counts.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let file: JsonFile<Counts> = JsonFile::new(&path);
        let result = file.write(&Counts::new()).await;

        assert!(matches!(result, Err(StoreError::Io { .. })));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(std::fs::read_to_string(path.join("keep")).unwrap(), "x");
    }
}
