use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::uploads::models::UploadedFile;

/// Upload form, documented for Swagger UI only.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The image; the field may also be named `file`
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
    /// Overrides the client-side filename
    pub filename: Option<String>,
    /// Where the upload comes from, e.g. `editor` or `featured_image`
    #[schema(example = "editor")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    pub id: Uuid,
    /// Public URL of the stored image
    pub url: String,
    /// Stored name, as served under `/api/uploads/`
    pub filename: String,
    pub original_filename: String,
    pub size: i64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<UploadedFile> for UploadResponseDto {
    fn from(f: UploadedFile) -> Self {
        let filename = f
            .storage_key
            .rsplit('/')
            .next()
            .unwrap_or(&f.storage_key)
            .to_string();
        Self {
            id: f.id,
            url: f.url,
            filename,
            original_filename: f.original_filename,
            size: f.size_bytes,
            content_type: f.content_type,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUploadResponseDto {
    pub deleted: bool,
}

/// Image types accepted for upload
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/avif",
    "image/bmp",
    "image/tiff",
    "image/x-icon",
];

/// Maximum upload size in bytes (5MB)
pub const MAX_UPLOAD_SIZE: usize = 5 * 1024 * 1024;

/// Bare lowercase media type, without parameters such as `charset`
pub fn normalize_content_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// File extension for an accepted content type
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        "image/x-icon" => Some("ico"),
        _ => None,
    }
}

/// Content type to serve a stored file with, from its extension
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Reject names that could escape the uploads directory
pub fn check_public_filename(filename: &str) -> Result<(), AppError> {
    if filename.is_empty() {
        return Err(AppError::BadRequest("Filename required".to_string()));
    }
    if filename.contains("..") || filename.contains('\\') || filename.starts_with('/') {
        return Err(AppError::BadRequest("Invalid filename".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_have_extensions() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(extension_for(mime).is_some(), "{}", mime);
        }
        assert!(!is_mime_type_allowed("application/pdf"));
        assert!(!is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("image/JPEG"), "image/jpeg");
        assert_eq!(normalize_content_type(" Image/Png ; name=x"), "image/png");
        assert!(is_mime_type_allowed(&normalize_content_type("IMAGE/WEBP")));
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("dir/b.svg"), "image/svg+xml");
        assert_eq!(content_type_for("favicon.ico"), "image/x-icon");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_check_public_filename() {
        assert!(check_public_filename("abc.png").is_ok());
        assert!(check_public_filename("2024/abc.png").is_ok());
        for bad in ["", "../secret", "a/../../b", "a\\b.png", "/etc/passwd"] {
            assert!(check_public_filename(bad).is_err(), "{}", bad);
        }
    }
}
