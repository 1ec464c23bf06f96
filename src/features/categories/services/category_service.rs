use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryWithCount};
use crate::shared::constants::{DEFAULT_CATEGORY_COLOR, DEFAULT_CATEGORY_ICON};
use crate::shared::text::slugify;

const CATEGORY_COLUMNS: &str =
    "c.id, c.name, c.slug, c.description, c.color, c.icon, c.sort_order, c.is_active, c.created_at, c.updated_at";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active categories with their published article counts
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS},
                   COUNT(a.id) FILTER (WHERE a.status = 'published') AS article_count
            FROM categories c
            LEFT JOIN articles a ON a.category_id = c.id
            WHERE c.is_active = TRUE
            GROUP BY c.id
            ORDER BY c.sort_order, c.name
            "#
        );

        let categories = sqlx::query_as::<_, CategoryWithCount>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// List every category, including inactive ones, with total article counts
    pub async fn list_all(&self) -> Result<Vec<CategoryResponseDto>> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS}, COUNT(a.id) AS article_count
            FROM categories c
            LEFT JOIN articles a ON a.category_id = c.id
            GROUP BY c.id
            ORDER BY c.sort_order, c.name
            "#
        );

        let categories = sqlx::query_as::<_, CategoryWithCount>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list all categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get active category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let sql = format!(
            r#"
            SELECT {CATEGORY_COLUMNS},
                   COUNT(a.id) FILTER (WHERE a.status = 'published') AS article_count
            FROM categories c
            LEFT JOIN articles a ON a.category_id = c.id
            WHERE c.slug = $1 AND c.is_active = TRUE
            GROUP BY c.id
            "#
        );

        let category = sqlx::query_as::<_, CategoryWithCount>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    async fn find(&self, id: Uuid) -> Result<Category> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.id = $1");

        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let slug = dto.slug.unwrap_or_else(|| slugify(&dto.name));

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, slug, description, color, icon, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, slug, description, color, icon, sort_order, is_active, created_at, updated_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(&slug)
        .bind(dto.description)
        .bind(dto.color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()))
        .bind(dto.icon.unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()))
        .bind(dto.sort_order.unwrap_or(0))
        .bind(dto.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create category: {:?}", e);
            AppError::from_unique_violation(e, format!("Category slug '{}' already exists", slug))
        })?;

        tracing::info!(slug = %category.slug, "Category created");
        Ok(category.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let current = self.find(id).await?;

        let name = dto.name.map(|n| n.trim().to_string()).unwrap_or(current.name);
        let slug = dto.slug.unwrap_or(current.slug);

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $2, slug = $3, description = $4, color = $5, icon = $6,
                sort_order = $7, is_active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, slug, description, color, icon, sort_order, is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&slug)
        .bind(dto.description.or(current.description))
        .bind(dto.color.unwrap_or(current.color))
        .bind(dto.icon.unwrap_or(current.icon))
        .bind(dto.sort_order.unwrap_or(current.sort_order))
        .bind(dto.is_active.unwrap_or(current.is_active))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update category: {:?}", e);
            AppError::from_unique_violation(e, format!("Category slug '{}' already exists", slug))
        })?;

        Ok(category.into())
    }

    /// Delete a category; its articles become uncategorised
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!(%id, "Category deleted");
        Ok(())
    }
}
