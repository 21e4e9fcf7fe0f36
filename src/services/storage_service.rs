use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::StorageConfig;
use crate::interceptors::{AppError, AppResult};

/// Object storage addressed by path-like keys. Implemented for local disks
/// here; a bucket-backed remote implementation plugs in behind the same seam.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> AppResult<()>;
    async fn get(&self, key: &str) -> AppResult<Vec<u8>>;
    async fn exists(&self, key: &str) -> AppResult<bool>;
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Filesystem-backed storage rooted at a directory.
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key under the root, rejecting traversal outside it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') {
            return Err(AppError::NotFound("Object not found".to_string()));
        }
        let has_traversal = Path::new(key)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir));
        if has_traversal {
            return Err(AppError::NotFound("Object not found".to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStorage for DiskStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::InternalError(format!("Failed to create storage directory: {}", e)))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write object {}: {}", key, e)))
    }

    async fn get(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|_| AppError::NotFound("Object not found".to_string()))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::InternalError(format!("Failed to delete object {}: {}", key, e))),
        }
    }
}

/// The two disks the application writes to: the public disk (avatars,
/// generated reports) and the bucket disk (product images).
pub struct StorageService {
    pub public: Box<dyn ObjectStorage>,
    pub bucket: Box<dyn ObjectStorage>,
    public_url: String,
}

impl StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            public: Box::new(DiskStorage::new(&config.public_root)),
            bucket: Box::new(DiskStorage::new(&config.bucket_root)),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Publicly resolvable URL for a key on the public disk.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk() -> (tempfile::TempDir, DiskStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path());
        (dir, storage)
    }

    #[tokio::test]
    async fn put_get_exists_delete_round_trip() {
        let (_dir, storage) = disk();
        let key = "products/20250101_120000_a1b2c3d4.png";

        assert!(!storage.exists(key).await.unwrap());
        storage.put(key, b"png-bytes").await.unwrap();
        assert!(storage.exists(key).await.unwrap());
        assert_eq!(storage.get(key).await.unwrap(), b"png-bytes");

        storage.delete(key).await.unwrap();
        assert!(!storage.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn missing_object_reads_as_not_found() {
        let (_dir, storage) = disk();
        match storage.get("products/missing.png").await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, storage) = disk();
        assert!(storage.get("../etc/passwd").await.is_err());
        assert!(storage.get("/absolute").await.is_err());
        assert!(storage.get("products/../../secret").await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_missing_object_is_a_no_op() {
        let (_dir, storage) = disk();
        assert!(storage.delete("avatars/nothing.png").await.is_ok());
    }

    #[test]
    fn public_url_joins_without_double_slash() {
        let config = StorageConfig {
            public_root: "storage/public".to_string(),
            bucket_root: "storage/bucket".to_string(),
            public_url: "http://localhost:3000/storage/".to_string(),
        };
        let service = StorageService::new(&config);
        assert_eq!(
            service.public_url("reports/products.pdf"),
            "http://localhost:3000/storage/reports/products.pdf"
        );
    }
}
