use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Publication state of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "article_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

/// Metadata of the image shown at the top of an article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeaturedImage {
    pub url: String,
    pub filename: Option<String>,
    pub size: Option<i64>,
    /// MIME type
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_position() -> String {
    "top".to_string()
}

/// Database model for article
#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: ArticleStatus,
    pub category_id: Option<Uuid>,
    pub is_featured: bool,
    pub featured_image: Option<Json<FeaturedImage>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub view_count: i64,
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article joined with its category's display fields
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    #[sqlx(flatten)]
    pub article: Article,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_featured_image_defaults_position() {
        let image: FeaturedImage =
            serde_json::from_str(r#"{"url": "/api/uploads/a.png", "type": "image/png"}"#).unwrap();
        assert_eq!(image.position, "top");
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
        assert!(image.alt.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ArticleStatus::Published).unwrap(),
            "published"
        );
    }
}
