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
use crate::features::articles::dtos::{
    AdminArticleQuery, ArticleResponseDto, ArticleSummaryDto, CreateArticleDto,
    DeleteArticleQuery, DeleteArticleResponseDto, PublicArticleQuery, UpdateArticleDto,
};
use crate::features::articles::services::ArticleService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List published articles
///
/// Newest first. Results can be narrowed to a category slug, to featured
/// articles, or to a search term.
#[utoipa::path(
    get,
    path = "/api/articles",
    params(PaginationQuery, PublicArticleQuery),
    responses(
        (status = 200, description = "List of articles", body = ApiResponse<Vec<ArticleSummaryDto>>),
    ),
    tag = "articles"
)]
pub async fn list_articles(
    State(service): State<Arc<ArticleService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(filter): Query<PublicArticleQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleSummaryDto>>>> {
    let (articles, total) = service
        .list_published(filter, pagination.offset(), pagination.limit())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(articles),
        None,
        Some(Meta { total }),
    )))
}

/// Get a published article by slug
///
/// Every successful read increments the article's view count.
#[utoipa::path(
    get,
    path = "/api/articles/{slug}",
    params(
        ("slug" = String, Path, description = "Article slug")
    ),
    responses(
        (status = 200, description = "Article found", body = ApiResponse<ArticleResponseDto>),
        (status = 404, description = "Article not found")
    ),
    tag = "articles"
)]
pub async fn get_article(
    State(service): State<Arc<ArticleService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ArticleResponseDto>>> {
    let article = service.get_published_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

/// List articles in any status
#[utoipa::path(
    get,
    path = "/api/admin/articles",
    params(PaginationQuery, AdminArticleQuery),
    responses(
        (status = 200, description = "List of articles", body = ApiResponse<Vec<ArticleSummaryDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_list_articles(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ArticleService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(filter): Query<AdminArticleQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleSummaryDto>>>> {
    let (articles, total) = service
        .list_admin(filter, pagination.offset(), pagination.limit())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(articles),
        None,
        Some(Meta { total }),
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 200, description = "Article found", body = ApiResponse<ArticleResponseDto>),
        (status = 404, description = "Article not found")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn admin_get_article(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ArticleResponseDto>>> {
    let article = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

/// Create an article
///
/// The slug is derived from the title when absent, and suffixed until unique.
/// The signed-in admin becomes the author unless `author_name` is given.
#[utoipa::path(
    post,
    path = "/api/admin/articles",
    request_body = CreateArticleDto,
    responses(
        (status = 201, description = "Article created", body = ApiResponse<ArticleResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_article(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ArticleService>>,
    AppJson(dto): AppJson<CreateArticleDto>,
) -> Result<(StatusCode, Json<ApiResponse<ArticleResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let article = service.create(dto, &admin.username).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(article),
            Some("Article created".to_string()),
            None,
        )),
    ))
}

/// Update an article
#[utoipa::path(
    put,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID")
    ),
    request_body = UpdateArticleDto,
    responses(
        (status = 200, description = "Article updated", body = ApiResponse<ArticleResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Article not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_article(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateArticleDto>,
) -> Result<Json<ApiResponse<ArticleResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let article = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(article), None, None)))
}

/// Archive or delete an article
///
/// Archives by default. With `force=true` the article and its comments are
/// removed permanently.
#[utoipa::path(
    delete,
    path = "/api/admin/articles/{id}",
    params(
        ("id" = Uuid, Path, description = "Article ID"),
        DeleteArticleQuery
    ),
    responses(
        (status = 200, description = "Article archived or deleted", body = ApiResponse<DeleteArticleResponseDto>),
        (status = 404, description = "Article not found")
    ),
    tag = "articles",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_article(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ArticleService>>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteArticleQuery>,
) -> Result<Json<ApiResponse<DeleteArticleResponseDto>>> {
    let deleted = service.delete(id, query.force).await?;
    let message = if deleted {
        "Article deleted"
    } else {
        "Article archived"
    };
    Ok(Json(ApiResponse::success(
        Some(DeleteArticleResponseDto { id, deleted }),
        Some(message.to_string()),
        None,
    )))
}
