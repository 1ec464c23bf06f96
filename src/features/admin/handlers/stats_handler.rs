use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::admin::dtos::AdminStatsDto;
use crate::features::admin::services::StatsService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::ApiResponse;

/// Dashboard counters for the back-office home page
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Content and audience counters", body = ApiResponse<AdminStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<StatsService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>> {
    let stats = service.overview().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
