use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Runtime setting stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}
