use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::features::settings::models::Setting;

/// Response DTO for a runtime setting
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettingResponseDto {
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

impl From<Setting> for SettingResponseDto {
    fn from(setting: Setting) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            description: setting.description,
            updated_at: setting.updated_at,
            updated_by: setting.updated_by,
        }
    }
}
