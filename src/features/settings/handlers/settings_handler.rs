use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAdmin;
use crate::features::settings::dtos::SettingResponseDto;
use crate::features::settings::services::SettingsService;
use crate::shared::types::ApiResponse;

/// List all runtime settings
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "List of settings", body = ApiResponse<Vec<SettingResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "settings",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<SettingsService>>,
) -> Result<Json<ApiResponse<Vec<SettingResponseDto>>>> {
    let settings = service.list_all().await?;
    let response: Vec<SettingResponseDto> = settings.into_iter().map(|s| s.into()).collect();

    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
