use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an uploaded file
#[derive(Debug, Clone, FromRow)]
pub struct UploadedFile {
    pub id: Uuid,
    pub storage_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub url: String,
    pub source: Option<String>,
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}
