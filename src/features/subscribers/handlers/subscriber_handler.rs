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
use crate::features::subscribers::dtos::{
    AdminSubscriberQuery, SubscribeDto, SubscriberCountDto, SubscriberResponseDto,
    UnsubscribeDto, UpdateSubscriberStatusDto,
};
use crate::features::subscribers::services::SubscriberService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Subscribe to the newsletter
///
/// A previously unsubscribed address is reactivated. Confirmation mail is
/// best-effort and never fails the request.
#[utoipa::path(
    post,
    path = "/api/newsletter",
    request_body = SubscribeDto,
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<SubscriberResponseDto>),
        (status = 400, description = "Invalid email"),
        (status = 409, description = "Already subscribed")
    ),
    tag = "newsletter"
)]
pub async fn subscribe(
    State(service): State<Arc<SubscriberService>>,
    AppJson(dto): AppJson<SubscribeDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriberResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let subscriber = service.subscribe(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(subscriber.into()),
            Some("Subscription confirmed, a confirmation email has been sent".to_string()),
            None,
        )),
    ))
}

/// Number of active subscribers
#[utoipa::path(
    get,
    path = "/api/newsletter",
    responses(
        (status = 200, description = "Active subscriber count", body = ApiResponse<SubscriberCountDto>),
    ),
    tag = "newsletter"
)]
pub async fn subscriber_count(
    State(service): State<Arc<SubscriberService>>,
) -> Result<Json<ApiResponse<SubscriberCountDto>>> {
    let count = service.active_count().await?;
    Ok(Json(ApiResponse::success(
        Some(SubscriberCountDto { count }),
        None,
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/newsletter/unsubscribe",
    request_body = UnsubscribeDto,
    responses(
        (status = 200, description = "Unsubscribed"),
        (status = 400, description = "Invalid email"),
        (status = 404, description = "Unknown email")
    ),
    tag = "newsletter"
)]
pub async fn unsubscribe(
    State(service): State<Arc<SubscriberService>>,
    AppJson(dto): AppJson<UnsubscribeDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.unsubscribe(&dto.email).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Unsubscribed".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/subscribers",
    params(PaginationQuery, AdminSubscriberQuery),
    responses(
        (status = 200, description = "Subscribers, newest first", body = ApiResponse<Vec<SubscriberResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "newsletter",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_subscribers(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SubscriberService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(query): Query<AdminSubscriberQuery>,
) -> Result<Json<ApiResponse<Vec<SubscriberResponseDto>>>> {
    let (subscribers, total) = service
        .list_admin(query, pagination.offset(), pagination.limit())
        .await?;
    let response: Vec<SubscriberResponseDto> =
        subscribers.into_iter().map(|s| s.into()).collect();

    Ok(Json(ApiResponse::success(
        Some(response),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/subscribers/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Subscriber ID")
    ),
    request_body = UpdateSubscriberStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<SubscriberResponseDto>),
        (status = 404, description = "Subscriber not found")
    ),
    tag = "newsletter",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_subscriber_status(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SubscriberService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateSubscriberStatusDto>,
) -> Result<Json<ApiResponse<SubscriberResponseDto>>> {
    let subscriber = service.set_status(id, dto.status).await?;
    Ok(Json(ApiResponse::success(
        Some(subscriber.into()),
        None,
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/subscribers/{id}",
    params(
        ("id" = Uuid, Path, description = "Subscriber ID")
    ),
    responses(
        (status = 200, description = "Subscriber deleted"),
        (status = 404, description = "Subscriber not found")
    ),
    tag = "newsletter",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_subscriber(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SubscriberService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Subscriber deleted".to_string()),
        None,
    )))
}
