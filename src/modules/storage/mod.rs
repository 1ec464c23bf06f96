//! Storage module for file management
//!
//! Provides the `ObjectStore` seam used by the uploads feature and its
//! MinIO/S3-compatible implementation.

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::AppError;

/// Object storage operations needed for public uploads
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError>;

    /// Fetch an object, `None` when it does not exist
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Remove an object; removing a missing object is not an error
    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// Full key for a path under the public prefix
    fn public_key(&self, path: &str) -> String;
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store for tests
    #[derive(Default)]
    pub struct MemoryStore {
        pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .get(key)
                .map(|(data, _)| data.clone()))
        }

        async fn remove(&self, key: &str) -> Result<(), AppError> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        fn public_key(&self, path: &str) -> String {
            format!("public/{}", path)
        }
    }
}
