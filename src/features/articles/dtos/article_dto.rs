use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::articles::models::{ArticleRow, ArticleStatus, FeaturedImage};
use crate::shared::validation::SLUG_REGEX;

/// Category fields embedded in article responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Full article, including content
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleResponseDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub status: ArticleStatus,
    pub category: Option<ArticleCategoryDto>,
    pub is_featured: bool,
    pub featured_image: Option<FeaturedImage>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Vec<String>,
    /// Estimated reading time in minutes
    pub read_time: i32,
    pub view_count: i64,
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article as shown in listings (no content body)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: ArticleStatus,
    pub category: Option<ArticleCategoryDto>,
    pub is_featured: bool,
    pub featured_image: Option<FeaturedImage>,
    pub tags: Vec<String>,
    pub read_time: i32,
    pub view_count: i64,
    pub author_name: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn category_of(row: &ArticleRow) -> Option<ArticleCategoryDto> {
    match (row.article.category_id, &row.category_name, &row.category_slug) {
        (Some(id), Some(name), Some(slug)) => Some(ArticleCategoryDto {
            id,
            name: name.clone(),
            slug: slug.clone(),
            color: row.category_color.clone(),
            icon: row.category_icon.clone(),
        }),
        _ => None,
    }
}

impl From<ArticleRow> for ArticleResponseDto {
    fn from(row: ArticleRow) -> Self {
        let category = category_of(&row);
        let a = row.article;
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            content: a.content,
            status: a.status,
            category,
            is_featured: a.is_featured,
            featured_image: a.featured_image.map(|j| j.0),
            meta_title: a.meta_title,
            meta_description: a.meta_description,
            tags: a.tags,
            read_time: a.read_time,
            view_count: a.view_count,
            author_name: a.author_name,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<ArticleRow> for ArticleSummaryDto {
    fn from(row: ArticleRow) -> Self {
        let category = category_of(&row);
        let a = row.article;
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            excerpt: a.excerpt,
            status: a.status,
            category,
            is_featured: a.is_featured,
            featured_image: a.featured_image.map(|j| j.0),
            tags: a.tags,
            read_time: a.read_time,
            view_count: a.view_count,
            author_name: a.author_name,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Filters for the public article listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PublicArticleQuery {
    /// Category slug
    pub category: Option<String>,
    /// Only featured articles when true
    pub featured: Option<bool>,
    /// Case-insensitive match on title, excerpt and content
    pub search: Option<String>,
}

/// Filters for the back-office article listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AdminArticleQuery {
    pub status: Option<ArticleStatus>,
    /// Category slug
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Query for article deletion
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DeleteArticleQuery {
    /// Permanently delete instead of archiving
    #[serde(default)]
    pub force: bool,
}

/// Request DTO for creating an article
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateArticleDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Derived from the content when absent
    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    /// Derived from the title when absent
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens"))]
    pub slug: Option<String>,

    /// Defaults to draft
    pub status: Option<ArticleStatus>,

    pub category_id: Option<Uuid>,

    /// Category name or slug, used when `category_id` is absent
    pub category: Option<String>,

    pub is_featured: Option<bool>,

    pub featured_image: Option<FeaturedImage>,

    #[validate(length(max = 200, message = "Meta title must be at most 200 characters"))]
    pub meta_title: Option<String>,

    #[validate(length(max = 300, message = "Meta description must be at most 300 characters"))]
    pub meta_description: Option<String>,

    pub tags: Option<Vec<String>>,

    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,
}

/// Request DTO for updating an article; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateArticleDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    #[validate(length(max = 500, message = "Excerpt must be at most 500 characters"))]
    pub excerpt: Option<String>,

    /// The slug only changes when given explicitly
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens"))]
    pub slug: Option<String>,

    pub status: Option<ArticleStatus>,

    pub category_id: Option<Uuid>,

    pub category: Option<String>,

    pub is_featured: Option<bool>,

    pub featured_image: Option<FeaturedImage>,

    #[validate(length(max = 200, message = "Meta title must be at most 200 characters"))]
    pub meta_title: Option<String>,

    #[validate(length(max = 300, message = "Meta description must be at most 300 characters"))]
    pub meta_description: Option<String>,

    pub tags: Option<Vec<String>>,

    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author_name: Option<String>,
}

/// Result of a delete request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteArticleResponseDto {
    pub id: Uuid,
    /// `true` when the row was removed, `false` when it was archived
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_accepts_back_office_payload() {
        let dto: CreateArticleDto = serde_json::from_value(serde_json::json!({
            "title": "Mon article",
            "content": "<p>Bonjour</p>",
            "category": "Santé",
            "status": "published",
            "is_featured": true,
            "featured_image": {
                "url": "http://storage/public/uploads/x.png",
                "filename": "x.png",
                "size": 1024,
                "type": "image/png",
                "alt": "Une image"
            }
        }))
        .unwrap();

        assert!(dto.validate().is_ok());
        assert_eq!(dto.status, Some(ArticleStatus::Published));
        assert_eq!(dto.featured_image.unwrap().position, "top");
    }

    #[test]
    fn test_create_requires_title_and_content() {
        let dto: CreateArticleDto =
            serde_json::from_value(serde_json::json!({"title": "", "content": ""})).unwrap();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("content"));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<CreateArticleDto, _> = serde_json::from_value(serde_json::json!({
            "title": "t", "content": "c", "status": "scheduled"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_query_defaults_to_archive() {
        let query: DeleteArticleQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!query.force);
    }
}
