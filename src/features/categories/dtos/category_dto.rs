use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryWithCount};
use crate::shared::validation::{HEX_COLOR_REGEX, SLUG_REGEX};

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
    /// Published articles for public listings, all articles for admin listings
    pub article_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryWithCount> for CategoryResponseDto {
    fn from(row: CategoryWithCount) -> Self {
        let mut dto = Self::from(row.category);
        dto.article_count = row.article_count;
        dto
    }
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            color: c.color,
            icon: c.icon,
            sort_order: c.sort_order,
            is_active: c.is_active,
            article_count: 0,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Derived from the name when absent
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens"))]
    pub slug: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    /// `#RRGGBB`, defaults to `#3B82F6`
    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be a #RRGGBB hex value"))]
    pub color: Option<String>,

    /// Emoji icon, defaults to 📁
    #[validate(length(min = 1, max = 16, message = "Icon must be 1-16 characters"))]
    pub icon: Option<String>,

    pub sort_order: Option<i32>,

    pub is_active: Option<bool>,
}

/// Request DTO for updating a category; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(regex(path = *SLUG_REGEX, message = "Slug must be lowercase words separated by hyphens"))]
    pub slug: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be a #RRGGBB hex value"))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 16, message = "Icon must be 1-16 characters"))]
    pub icon: Option<String>,

    pub sort_order: Option<i32>,

    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            slug: None,
            description: None,
            color: None,
            icon: None,
            sort_order: None,
            is_active: None,
        }
    }

    #[test]
    fn test_create_minimal_is_valid() {
        assert!(create("Bien-être").validate().is_ok());
    }

    #[test]
    fn test_create_rejects_empty_name() {
        assert!(create("").validate().is_err());
    }

    #[test]
    fn test_create_rejects_bad_color_and_slug() {
        let mut dto = create("Voyages");
        dto.color = Some("blue".to_string());
        assert!(dto.validate().is_err());

        let mut dto = create("Voyages");
        dto.slug = Some("Voyages Lointains".to_string());
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_empty_is_valid() {
        assert!(UpdateCategoryDto::default().validate().is_ok());
    }
}
