//! Blob storage for uploaded document bytes.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::domain::document::file_extension;
use crate::domain::types::ClientId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Port for reading and writing document blobs by key.
pub trait FileStorage {
    /// Stores everything readable from `data` under `key` and returns the byte count.
    fn save(&self, key: &str, data: &mut dyn Read) -> StorageResult<u64>;
    fn load(&self, key: &str) -> StorageResult<Vec<u8>>;
    /// Removing a missing object is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Builds a fresh key `"{client_id}/{uuid}.{ext}"` for an uploaded file.
pub fn storage_key(client_id: ClientId, filename: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match file_extension(filename) {
        Some(ext) => format!("{}/{id}.{ext}", client_id.get()),
        None => format!("{}/{id}", client_id.get()),
    }
}

/// Stores blobs as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalFileStorage {
    fn save(&self, key: &str, data: &mut dyn Read) -> StorageResult<u64> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&path)?;
        let written = io::copy(data, &mut file).inspect_err(|_| {
            if let Err(err) = fs::remove_file(&path) {
                log::warn!("Failed to remove partial upload {}: {err}", path.display());
            }
        })?;
        Ok(written)
    }

    fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve(key)?;
        fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Io(err),
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}
