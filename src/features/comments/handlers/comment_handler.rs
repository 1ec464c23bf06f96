use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{client_ip, user_agent, AppJson};
use crate::features::auth::guards::RequireAdmin;
use crate::features::comments::dtos::{
    AdminCommentDto, AdminCommentQuery, CommentResponseDto, CommentThreadQuery,
    CreateCommentDto, UpdateCommentStatusDto,
};
use crate::features::comments::models::CommentStatus;
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List approved comments of an article
#[utoipa::path(
    get,
    path = "/api/comments",
    params(PaginationQuery, CommentThreadQuery),
    responses(
        (status = 200, description = "Approved comments, oldest first", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 400, description = "Missing article_slug")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(service): State<Arc<CommentService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<CommentThreadQuery>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let slug = query
        .article_slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("article_slug is required".to_string()))?;

    let (comments, total) = service
        .list_approved(slug, pagination.offset(), pagination.limit())
        .await?;
    let response: Vec<CommentResponseDto> = comments.into_iter().map(|c| c.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(response),
        None,
        Some(Meta { total }),
    )))
}

/// Post a comment
///
/// The comment is published immediately when auto-approval is enabled,
/// otherwise it waits in the moderation queue.
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment received", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Article not found")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(service): State<Arc<CommentService>>,
    headers: HeaderMap,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    let dto = dto.trimmed();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service
        .create(dto, &client_ip(&headers), &user_agent(&headers))
        .await?;

    let message = if comment.status == CommentStatus::Approved {
        "Comment published"
    } else {
        "Comment awaiting moderation"
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(comment.into()),
            Some(message.to_string()),
            None,
        )),
    ))
}

/// List comments for moderation
#[utoipa::path(
    get,
    path = "/api/admin/comments",
    params(PaginationQuery, AdminCommentQuery),
    responses(
        (status = 200, description = "Comments, newest first", body = ApiResponse<Vec<AdminCommentDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_comments(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CommentService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<AdminCommentQuery>,
) -> Result<Json<ApiResponse<Vec<AdminCommentDto>>>> {
    let (comments, total) = service
        .list_admin(query, pagination.offset(), pagination.limit())
        .await?;
    let response: Vec<AdminCommentDto> = comments.into_iter().map(|c| c.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(response),
        None,
        Some(Meta { total }),
    )))
}

/// Change the moderation status of a comment
#[utoipa::path(
    put,
    path = "/api/admin/comments/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<AdminCommentDto>),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_comment_status(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCommentStatusDto>,
) -> Result<Json<ApiResponse<AdminCommentDto>>> {
    let comment = service.set_status(id, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(comment.into()), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 404, description = "Comment not found")
    ),
    tag = "comments",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_comment(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
        None,
    )))
}
