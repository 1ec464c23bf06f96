use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireAdmin;
use crate::features::uploads::dtos::{
    check_public_filename, content_type_for, is_mime_type_allowed, normalize_content_type,
    DeleteUploadResponseDto, UploadFileDto, UploadResponseDto, ALLOWED_MIME_TYPES,
    MAX_UPLOAD_SIZE,
};
use crate::features::uploads::services::{NewUpload, UploadService};
use crate::shared::types::ApiResponse;

/// Upload an image
///
/// Accepts multipart/form-data with:
/// - `image` or `file`: the image (required)
/// - `filename`: overrides the client-side filename
/// - `source`: where the upload comes from
#[utoipa::path(
    post,
    path = "/api/admin/uploads",
    tag = "uploads",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Image upload form",
    ),
    responses(
        (status = 201, description = "Image uploaded", body = ApiResponse<UploadResponseDto>),
        (status = 400, description = "Missing file, wrong type or too large"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UploadService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponseDto>>)> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut filename_override: Option<String> = None;
    let mut source: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" | "file" => {
                let content_type = field
                    .content_type()
                    .map(normalize_content_type)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;
                file = Some((data.to_vec(), name, content_type));
            }
            "filename" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read filename field: {}", e))
                })?;
                filename_override = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            "source" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read source field: {}", e))
                })?;
                source = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (data, original_name, content_type) =
        file.ok_or_else(|| AppError::BadRequest("An image file is required".to_string()))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    if data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    if !is_mime_type_allowed(&content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }

    let upload = NewUpload {
        data,
        original_filename: filename_override.unwrap_or(original_name),
        content_type,
        source,
    };

    let response = service.upload(upload, &admin.username).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("Image uploaded".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/admin/uploads/{id}",
    params(
        ("id" = Uuid, Path, description = "Upload ID")
    ),
    responses(
        (status = 200, description = "Upload deleted", body = ApiResponse<DeleteUploadResponseDto>),
        (status = 404, description = "Upload not found")
    ),
    tag = "uploads",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_upload(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<UploadService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteUploadResponseDto>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteUploadResponseDto { deleted: true }),
        Some("Upload deleted".to_string()),
        None,
    )))
}

/// Serve an uploaded image
#[utoipa::path(
    get,
    path = "/api/uploads/{filename}",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 400, description = "Invalid filename"),
        (status = 404, description = "File not found")
    ),
    tag = "uploads"
)]
pub async fn serve_upload(
    State(service): State<Arc<UploadService>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    check_public_filename(&filename)?;

    let data = service.read_public(&filename).await?;
    let etag = format!("\"{}-{}\"", filename, data.len());

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
            (header::ETAG, etag),
        ],
        data,
    ))
}
