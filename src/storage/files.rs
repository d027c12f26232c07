use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::StorageError;
use super::path::validate_object_path;

/// The `files` bucket, kept on the local filesystem under `<data_dir>/files`.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("files"),
        }
    }

    fn resolve(&self, object_path: &str) -> Result<PathBuf, StorageError> {
        validate_object_path(object_path)?;
        Ok(self.base_path.join(object_path))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(Uuid::new_v4().to_string())
    }

    pub async fn get(&self, object_path: &str) -> Result<(File, u64), StorageError> {
        let path = self.resolve(object_path)?;
        let file = File::open(&path).await.map_err(StorageError::from_io)?;

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound);
        }

        Ok((file, metadata.len()))
    }

    /// Writes through a temp file and renames into place, so readers never see partial objects.
    pub async fn put(&self, object_path: &str, data: &[u8]) -> Result<(), StorageError> {
        let final_path = self.resolve(object_path)?;

        let temp_path = self.temp_path();
        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(data).await?;
        temp_file.sync_all().await?;

        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::rename(&temp_path, &final_path).await?;

        Ok(())
    }
}
