use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::uploads::dtos::{extension_for, UploadResponseDto};
use crate::features::uploads::models::UploadedFile;
use crate::modules::storage::ObjectStore;

/// Directory under the public prefix where uploads are stored
const UPLOAD_DIR: &str = "uploads";

/// Route serving stored uploads
const SERVE_PATH: &str = "/api/uploads";

/// A validated upload waiting to be stored
#[derive(Debug)]
pub struct NewUpload {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
    pub source: Option<String>,
}

/// Service for image uploads
pub struct UploadService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl UploadService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { pool, store }
    }

    /// Store the image under a fresh name and record its metadata
    pub async fn upload(&self, upload: NewUpload, uploaded_by: &str) -> Result<UploadResponseDto> {
        let extension = extension_for(&upload.content_type).unwrap_or("bin");
        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let key = self
            .store
            .public_key(&format!("{}/{}", UPLOAD_DIR, stored_name));

        self.store
            .put(&key, &upload.data, &upload.content_type)
            .await?;
        tracing::debug!("Upload stored: {}", key);

        let url = format!("{}/{}", SERVE_PATH, stored_name);

        let file = sqlx::query_as::<_, UploadedFile>(
            r#"
            INSERT INTO uploaded_files
                (storage_key, original_filename, content_type, size_bytes, url, source, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, storage_key, original_filename, content_type, size_bytes, url,
                      source, uploaded_by, created_at
            "#,
        )
        .bind(&key)
        .bind(&upload.original_filename)
        .bind(&upload.content_type)
        .bind(upload.data.len() as i64)
        .bind(&url)
        .bind(&upload.source)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await;

        let file = match file {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to save upload metadata: {:?}", e);
                if let Err(cleanup) = self.store.remove(&key).await {
                    tracing::warn!("Failed to remove orphaned upload {}: {}", key, cleanup);
                }
                return Err(AppError::Database(e));
            }
        };

        tracing::info!(
            id = %file.id,
            key = %file.storage_key,
            size = file.size_bytes,
            "Upload saved"
        );
        Ok(file.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let key: Option<String> =
            sqlx::query_scalar("SELECT storage_key FROM uploaded_files WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up upload: {:?}", e);
                    AppError::Database(e)
                })?;

        let key = key.ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;

        self.store.remove(&key).await?;

        sqlx::query("DELETE FROM uploaded_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete upload metadata: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!(%id, key = %key, "Upload deleted");
        Ok(())
    }

    /// Bytes of a public upload by its served name
    pub async fn read_public(&self, filename: &str) -> Result<Vec<u8>> {
        let key = self
            .store
            .public_key(&format!("{}/{}", UPLOAD_DIR, filename));

        self.store
            .get(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File '{}' not found", filename)))
    }
}
