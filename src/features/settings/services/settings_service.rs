use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::settings::models::Setting;

/// Service for key/value runtime settings
pub struct SettingsService {
    pool: PgPool,
}

impl SettingsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all settings
    pub async fn list_all(&self) -> Result<Vec<Setting>> {
        sqlx::query_as::<_, Setting>(
            r#"
            SELECT key, value, description, updated_at, updated_by
            FROM settings
            ORDER BY key
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list settings: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Read a boolean setting, falling back to `default` when unset or not a boolean
    pub async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read setting '{}': {:?}", key, e);
                    AppError::Database(e)
                })?;

        Ok(value.and_then(|v| v.as_bool()).unwrap_or(default))
    }

    /// Store a boolean setting, creating it if missing
    pub async fn set_bool(&self, key: &str, value: bool, updated_by: &str) -> Result<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, updated_by, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = NOW()
            RETURNING key, value, description, updated_at, updated_by
            "#,
        )
        .bind(key)
        .bind(serde_json::Value::Bool(value))
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update setting '{}': {:?}", key, e);
            AppError::Database(e)
        })?;

        tracing::info!(key, value, updated_by, "Setting updated");
        Ok(setting)
    }
}
