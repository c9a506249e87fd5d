//! Attachment file storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Byte storage for uploaded files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist bytes under a fresh name that keeps the original extension.
    /// Returns the storage path.
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Size in bytes of a stored file.
    async fn size_of(&self, path: &str) -> Result<u64, StorageError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;
}

/// Stores files in a local directory as `<uuid><ext>`.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_name_for(original_name: &str) -> String {
        match Path::new(original_name).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        }
    }
}

fn not_found_or_io(path: &str, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(Self::file_name_for(original_name));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");

        Ok(path.to_string_lossy().into_owned())
    }

    async fn size_of(&self, path: &str) -> Result<u64, StorageError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| not_found_or_io(path, e))?;
        Ok(metadata.len())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(path).await.map_err(|e| not_found_or_io(path, e))
    }
}
