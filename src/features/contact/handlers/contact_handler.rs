use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::contact::dtos::{ContactMessage, ContactRequestDto};
use crate::features::contact::services::ContactService;
use crate::shared::types::ApiResponse;

/// Send a message to the site owner
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequestDto,
    responses(
        (status = 200, description = "Message sent"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 502, description = "Mail delivery failed")
    ),
    tag = "contact"
)]
pub async fn send_contact(
    State(service): State<Arc<ContactService>>,
    AppJson(dto): AppJson<ContactRequestDto>,
) -> Result<Json<ApiResponse<()>>> {
    let message = ContactMessage::from(dto);
    message
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.send(message).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Message sent".to_string()),
        None,
    )))
}
