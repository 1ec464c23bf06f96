use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::chat::dtos::{
    AdminMessageDto, AutoReplyDto, ChatMessageDto, ChatStatusDto, ConversationDto,
    ConversationQuery, ConversationSummaryDto, MessagesQuery, SuggestionDto,
    UpdateConversationStatusDto,
};
use crate::features::chat::models::SenderRole;
use crate::features::chat::services::ChatService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Chat inbox
#[utoipa::path(
    get,
    path = "/api/admin/chat/conversations",
    params(PaginationQuery, ConversationQuery),
    responses(
        (status = 200, description = "Conversations, most recent activity first", body = ApiResponse<Vec<ConversationSummaryDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_conversations(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<ApiResponse<Vec<ConversationSummaryDto>>>> {
    let (conversations, total) = service
        .list_conversations(query.status, pagination.offset(), pagination.limit())
        .await?;
    let response: Vec<ConversationSummaryDto> =
        conversations.into_iter().map(|c| c.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(response),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/chat/conversations/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Conversation ID"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Messages in chronological order", body = ApiResponse<Vec<ChatMessageDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_conversation_messages(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiResponse<Vec<ChatMessageDto>>>> {
    let messages = service.messages(id, query.after).await?;
    let response: Vec<ChatMessageDto> = messages.into_iter().map(|m| m.into()).collect();

    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Answer a visitor as the signed-in admin
#[utoipa::path(
    post,
    path = "/api/admin/chat/conversations/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Conversation ID")
    ),
    request_body = AdminMessageDto,
    responses(
        (status = 201, description = "Message stored", body = ApiResponse<ChatMessageDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn post_admin_message(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AdminMessageDto>,
) -> Result<(StatusCode, Json<ApiResponse<ChatMessageDto>>)> {
    let dto = AdminMessageDto {
        message: dto.message.trim().to_string(),
    };
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let message = service
        .add_message(id, SenderRole::Admin, &admin.username, &dto.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(message.into()),
            Some("Message sent".to_string()),
            None,
        )),
    ))
}

/// Draft a reply with the language model
///
/// The draft is returned for review and is not stored.
#[utoipa::path(
    post,
    path = "/api/admin/chat/conversations/{id}/suggestion",
    params(
        ("id" = Uuid, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Suggested reply", body = ApiResponse<SuggestionDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found"),
        (status = 502, description = "Model unavailable")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn suggest_reply(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SuggestionDto>>> {
    let suggestion = service.suggest(id).await?;

    Ok(Json(ApiResponse::success(
        Some(SuggestionDto { suggestion }),
        None,
        None,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/chat/conversations/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Conversation ID")
    ),
    request_body = UpdateConversationStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ConversationDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Conversation not found")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_conversation_status(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateConversationStatusDto>,
) -> Result<Json<ApiResponse<ConversationDto>>> {
    let conversation = service.set_status(id, dto.status).await?;

    Ok(Json(ApiResponse::success(
        Some(conversation.into()),
        Some("Conversation updated".to_string()),
        None,
    )))
}

/// Assistant availability
#[utoipa::path(
    get,
    path = "/api/admin/chat/status",
    responses(
        (status = 200, description = "Model and auto-reply state", body = ApiResponse<ChatStatusDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_chat_status(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
) -> Result<Json<ApiResponse<ChatStatusDto>>> {
    let status = ChatStatusDto {
        llm_available: service.llm_available(),
        auto_reply_enabled: service.auto_reply_enabled().await?,
    };

    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

#[utoipa::path(
    get,
    path = "/api/admin/chat/auto-reply",
    responses(
        (status = 200, description = "Auto-reply flag", body = ApiResponse<AutoReplyDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_auto_reply(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
) -> Result<Json<ApiResponse<AutoReplyDto>>> {
    let enabled = service.auto_reply_enabled().await?;
    Ok(Json(ApiResponse::success(
        Some(AutoReplyDto { enabled }),
        None,
        None,
    )))
}

/// Turn assistant auto-replies on or off
///
/// Takes effect for replies already being drafted.
#[utoipa::path(
    put,
    path = "/api/admin/chat/auto-reply",
    request_body = AutoReplyDto,
    responses(
        (status = 200, description = "Flag updated", body = ApiResponse<AutoReplyDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "chat",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_auto_reply(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ChatService>>,
    AppJson(dto): AppJson<AutoReplyDto>,
) -> Result<Json<ApiResponse<AutoReplyDto>>> {
    let enabled = service.set_auto_reply(dto.enabled, &admin.username).await?;
    Ok(Json(ApiResponse::success(
        Some(AutoReplyDto { enabled }),
        Some("Auto-reply updated".to_string()),
        None,
    )))
}
