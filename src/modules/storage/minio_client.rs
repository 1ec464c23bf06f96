//! MinIO/S3-compatible storage client
//!
//! Objects stay private in the bucket; uploads reach readers through the
//! API's own `/api/uploads` route.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::AppError;
use crate::modules::storage::ObjectStore;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    key_prefix: String,
}

impl MinIOClient {
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region,
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // MinIO wants http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        info!(
            "MinIO client configured for endpoint: {}, bucket: {}, prefix: {}",
            config.endpoint,
            bucket.name(),
            config.public_prefix
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            key_prefix: config.public_prefix.trim_matches('/').to_string(),
        })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Create the bucket unless it is already there
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        let created = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match created {
            Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
            Err(e) if already_exists(&e) => {
                debug!("Bucket '{}' already exists", self.bucket.name())
            }
            // Some providers refuse CreateBucket for existing buckets with other codes
            Err(e) => warn!(
                "Could not create bucket '{}': {}. Assuming it exists.",
                self.bucket.name(),
                e
            ),
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.bucket.head_object(key).await {
            Ok((_, status)) => Ok((200..300).contains(&status)),
            Err(e) if is_missing_object(&e) => Ok(false),
            Err(e) => Err(storage_error("check", key, e)),
        }
    }
}

fn already_exists(error: &S3Error) -> bool {
    let message = error.to_string();
    message.contains("BucketAlreadyOwnedByYou")
        || message.contains("BucketAlreadyExists")
        || message.contains("already own it")
}

fn is_missing_object(error: &S3Error) -> bool {
    let message = error.to_string();
    message.contains("404") || message.contains("NoSuchKey")
}

fn storage_error(action: &str, key: &str, error: impl std::fmt::Display) -> AppError {
    AppError::ExternalServiceError(format!("Failed to {} object '{}': {}", action, key, error))
}

/// `<prefix>/<path>` with a single separator
fn prefixed_key(prefix: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| storage_error("upload", key, e))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(storage_error("upload", key, format!("status {}", status)));
        }

        debug!("Stored '{}' ({} bytes)", key, data.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        let response = match self.bucket.get_object(key).await {
            Ok(response) => response,
            Err(e) if is_missing_object(&e) => return Ok(None),
            Err(e) => return Err(storage_error("download", key, e)),
        };

        match response.status_code() {
            200..=299 => Ok(Some(response.to_vec())),
            404 => Ok(None),
            status => Err(storage_error("download", key, format!("status {}", status))),
        }
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        if !self.exists(key).await? {
            warn!("Object '{}' already absent from storage", key);
            return Ok(());
        }

        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| storage_error("delete", key, e))?;
        debug!("Removed '{}'", key);
        Ok(())
    }

    fn public_key(&self, path: &str) -> String {
        prefixed_key(&self.key_prefix, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key() {
        assert_eq!(prefixed_key("public", "uploads/a.png"), "public/uploads/a.png");
        assert_eq!(prefixed_key("public", "/uploads/a.png"), "public/uploads/a.png");
        assert_eq!(prefixed_key("", "uploads/a.png"), "uploads/a.png");
    }

    #[test]
    fn test_storage_error_is_bad_gateway() {
        assert!(matches!(
            storage_error("upload", "k", "boom"),
            AppError::ExternalServiceError(msg) if msg == "Failed to upload object 'k': boom"
        ));
    }
}
