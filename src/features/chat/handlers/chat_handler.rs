use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::chat::dtos::{
    ChatMessageDto, MessagesQuery, VisitorMessageDto, VisitorMessageResponseDto,
};
use crate::features::chat::services::ChatService;
use crate::shared::types::ApiResponse;

/// Send a message from the chat widget
///
/// Opens the session's conversation on first contact. When a model is
/// configured and auto-reply is on, the assistant answers in the background;
/// poll the session messages to receive it.
#[utoipa::path(
    post,
    path = "/api/chat/messages",
    request_body = VisitorMessageDto,
    responses(
        (status = 201, description = "Message stored", body = ApiResponse<VisitorMessageResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "chat"
)]
pub async fn post_visitor_message(
    State(service): State<Arc<ChatService>>,
    AppJson(dto): AppJson<VisitorMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<VisitorMessageResponseDto>>)> {
    let dto = dto.trimmed();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (conversation, message) = service.post_visitor_message(dto).await?;

    if service.llm_available() {
        service.spawn_auto_reply(conversation.id);
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(VisitorMessageResponseDto {
                conversation_id: conversation.id,
                message: message.into(),
            }),
            Some("Message sent".to_string()),
            None,
        )),
    ))
}

/// Poll the messages of a visitor session
#[utoipa::path(
    get,
    path = "/api/chat/sessions/{session_id}/messages",
    params(
        ("session_id" = String, Path, description = "Widget session identifier"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Messages in chronological order", body = ApiResponse<Vec<ChatMessageDto>>)
    ),
    tag = "chat"
)]
pub async fn get_session_messages(
    State(service): State<Arc<ChatService>>,
    Path(session_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessageDto>>>> {
    let messages = service.session_messages(&session_id, query.after).await?;
    let response: Vec<ChatMessageDto> = messages.into_iter().map(|m| m.into()).collect();

    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
