use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::articles::dtos::{
    AdminArticleQuery, ArticleResponseDto, ArticleSummaryDto, CreateArticleDto,
    PublicArticleQuery, UpdateArticleDto,
};
use crate::features::articles::models::{Article, ArticleRow, ArticleStatus};
use crate::shared::constants::EXCERPT_LENGTH;
use crate::shared::text::{excerpt_from, like_pattern, normalize_tags, read_time_minutes, slugify};

const ARTICLE_SELECT: &str = r#"
    SELECT a.id, a.title, a.slug, a.excerpt, a.content, a.status, a.category_id, a.is_featured,
           a.featured_image, a.meta_title, a.meta_description, a.tags, a.read_time, a.view_count,
           a.author_name, a.published_at, a.created_at, a.updated_at,
           c.name AS category_name, c.slug AS category_slug,
           c.color AS category_color, c.icon AS category_icon
    FROM articles a
    LEFT JOIN categories c ON c.id = a.category_id
    WHERE 1 = 1
"#;

const ARTICLE_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM articles a
    LEFT JOIN categories c ON c.id = a.category_id
    WHERE 1 = 1
"#;

/// Listing filters shared by the public and back-office queries
#[derive(Debug, Default)]
struct ArticleFilter {
    status: Option<ArticleStatus>,
    category_slug: Option<String>,
    featured: Option<bool>,
    search: Option<String>,
}

impl From<PublicArticleQuery> for ArticleFilter {
    fn from(q: PublicArticleQuery) -> Self {
        Self {
            status: Some(ArticleStatus::Published),
            category_slug: q.category,
            featured: q.featured,
            search: q.search,
        }
    }
}

impl From<AdminArticleQuery> for ArticleFilter {
    fn from(q: AdminArticleQuery) -> Self {
        Self {
            status: q.status,
            category_slug: q.category,
            featured: None,
            search: q.search,
        }
    }
}

impl ArticleFilter {
    fn push(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(status) = self.status {
            qb.push(" AND a.status = ").push_bind(status);
        }
        if let Some(slug) = self.category_slug.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND c.slug = ").push_bind(slug.to_string());
        }
        if let Some(featured) = self.featured {
            qb.push(" AND a.is_featured = ").push_bind(featured);
        }
        if let Some(term) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(term);
            qb.push(" AND (a.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.excerpt ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR a.content ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
}

/// First free slug among `base`, `base-2`, `base-3`… given the slugs already taken
pub fn next_available_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| format!("{}-{}", base, Uuid::new_v4().simple()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Partial update of an optional text field: absent keeps, blank clears
fn patch_text(value: Option<String>, current: Option<String>) -> Option<String> {
    match value {
        Some(value) => non_empty(Some(value)),
        None => current,
    }
}

/// Service for article operations
pub struct ArticleService {
    pool: PgPool,
}

impl ArticleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_filtered(
        &self,
        filter: ArticleFilter,
        order_by: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ArticleSummaryDto>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new(ARTICLE_COUNT);
        filter.push(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count articles: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(ARTICLE_SELECT);
        filter.push(&mut qb);
        qb.push(" ORDER BY ")
            .push(order_by)
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<ArticleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list articles: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((rows.into_iter().map(|r| r.into()).collect(), total))
    }

    /// Published articles, newest first
    pub async fn list_published(
        &self,
        query: PublicArticleQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ArticleSummaryDto>, i64)> {
        self.list_filtered(
            query.into(),
            "a.published_at DESC NULLS LAST, a.created_at DESC",
            offset,
            limit,
        )
        .await
    }

    /// Articles in any status, most recently edited first
    pub async fn list_admin(
        &self,
        query: AdminArticleQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ArticleSummaryDto>, i64)> {
        self.list_filtered(query.into(), "a.updated_at DESC", offset, limit)
            .await
    }

    /// Latest published articles for the RSS feed
    pub async fn latest_published(&self, limit: i64) -> Result<Vec<ArticleSummaryDto>> {
        let (items, _) = self
            .list_filtered(
                ArticleFilter {
                    status: Some(ArticleStatus::Published),
                    ..Default::default()
                },
                "a.published_at DESC NULLS LAST, a.created_at DESC",
                0,
                limit,
            )
            .await?;
        Ok(items)
    }

    async fn fetch_row(&self, id: Uuid) -> Result<ArticleRow> {
        let mut qb = QueryBuilder::<Postgres>::new(ARTICLE_SELECT);
        qb.push(" AND a.id = ").push_bind(id);

        qb.build_query_as::<ArticleRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get article: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))
    }

    /// Any article by id
    pub async fn get(&self, id: Uuid) -> Result<ArticleResponseDto> {
        Ok(self.fetch_row(id).await?.into())
    }

    /// Published article by slug; each read counts as a view
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<ArticleResponseDto> {
        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE articles
            SET view_count = view_count + 1
            WHERE slug = $1 AND status = 'published'
            RETURNING id
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record article view: {:?}", e);
            AppError::Database(e)
        })?;

        let id = id.ok_or_else(|| AppError::NotFound(format!("Article '{}' not found", slug)))?;
        self.get(id).await
    }

    /// Resolve a category from an explicit id or from a name/slug reference
    async fn resolve_category(
        &self,
        category_id: Option<Uuid>,
        reference: Option<&str>,
    ) -> Result<Option<Uuid>> {
        if let Some(id) = category_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(AppError::Validation(format!("Unknown category {}", id)));
            }
            return Ok(Some(id));
        }

        let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        let id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM categories
            WHERE slug = $1 OR slug = $2 OR LOWER(name) = LOWER($1)
            ORDER BY sort_order
            LIMIT 1
            "#,
        )
        .bind(reference)
        .bind(slugify(reference))
        .fetch_optional(&self.pool)
        .await?;

        id.map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown category '{}'", reference)))
    }

    /// Derive a unique slug from `base`, ignoring the article being edited
    async fn unique_slug(&self, base: &str, exclude: Option<Uuid>) -> Result<String> {
        let taken: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT slug FROM articles
            WHERE (slug = $1 OR slug LIKE $2)
              AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(base)
        .bind(format!("{}-%", base))
        .bind(exclude)
        .fetch_all(&self.pool)
        .await?;

        Ok(next_available_slug(base, &taken))
    }

    pub async fn create(&self, dto: CreateArticleDto, author: &str) -> Result<ArticleResponseDto> {
        let category_id = self
            .resolve_category(dto.category_id, dto.category.as_deref())
            .await?;

        let slug = match dto.slug {
            Some(slug) => slug,
            None => self.unique_slug(&slugify(&dto.title), None).await?,
        };

        let status = dto.status.unwrap_or(ArticleStatus::Draft);
        let published_at = (status == ArticleStatus::Published).then(Utc::now);
        let excerpt = non_empty(dto.excerpt)
            .unwrap_or_else(|| excerpt_from(&dto.content, EXCERPT_LENGTH));
        let author_name = non_empty(dto.author_name).unwrap_or_else(|| author.to_string());

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO articles (
                title, slug, excerpt, content, status, category_id, is_featured, featured_image,
                meta_title, meta_description, tags, read_time, author_name, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(dto.title.trim())
        .bind(&slug)
        .bind(excerpt)
        .bind(&dto.content)
        .bind(status)
        .bind(category_id)
        .bind(dto.is_featured.unwrap_or(false))
        .bind(dto.featured_image.map(Json))
        .bind(non_empty(dto.meta_title))
        .bind(non_empty(dto.meta_description))
        .bind(normalize_tags(&dto.tags.unwrap_or_default()))
        .bind(read_time_minutes(&dto.content))
        .bind(author_name)
        .bind(published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create article: {:?}", e);
            AppError::from_unique_violation(e, format!("Article slug '{}' already exists", slug))
        })?;

        tracing::info!(%id, slug = %slug, ?status, "Article created");
        self.get(id).await
    }

    async fn find(&self, id: Uuid) -> Result<Article> {
        sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, slug, excerpt, content, status, category_id, is_featured,
                   featured_image, meta_title, meta_description, tags, read_time, view_count,
                   author_name, published_at, created_at, updated_at
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article {} not found", id)))
    }

    pub async fn update(&self, id: Uuid, dto: UpdateArticleDto) -> Result<ArticleResponseDto> {
        let current = self.find(id).await?;

        let category_id = if dto.category_id.is_some() || dto.category.is_some() {
            self.resolve_category(dto.category_id, dto.category.as_deref())
                .await?
        } else {
            current.category_id
        };

        let slug = dto.slug.unwrap_or(current.slug);
        let status = dto.status.unwrap_or(current.status);
        let published_at = match (status, current.published_at) {
            (ArticleStatus::Published, None) => Some(Utc::now()),
            (_, existing) => existing,
        };

        let content = dto.content.unwrap_or(current.content);
        let excerpt = patch_text(dto.excerpt, current.excerpt);
        let tags = dto
            .tags
            .map(|t| normalize_tags(&t))
            .unwrap_or(current.tags);

        sqlx::query(
            r#"
            UPDATE articles
            SET title = $2, slug = $3, excerpt = $4, content = $5, status = $6, category_id = $7,
                is_featured = $8, featured_image = $9, meta_title = $10, meta_description = $11,
                tags = $12, read_time = $13, author_name = $14, published_at = $15,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(dto.title.map(|t| t.trim().to_string()).unwrap_or(current.title))
        .bind(&slug)
        .bind(excerpt)
        .bind(&content)
        .bind(status)
        .bind(category_id)
        .bind(dto.is_featured.unwrap_or(current.is_featured))
        .bind(dto.featured_image.map(Json).or(current.featured_image))
        .bind(patch_text(dto.meta_title, current.meta_title))
        .bind(patch_text(dto.meta_description, current.meta_description))
        .bind(tags)
        .bind(read_time_minutes(&content))
        .bind(patch_text(dto.author_name, current.author_name))
        .bind(published_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update article: {:?}", e);
            AppError::from_unique_violation(e, format!("Article slug '{}' already exists", slug))
        })?;

        self.get(id).await
    }

    /// Archive an article, or remove it and its comments when `force` is set.
    ///
    /// Returns `true` when the row was deleted.
    pub async fn delete(&self, id: Uuid, force: bool) -> Result<bool> {
        let sql = if force {
            "DELETE FROM articles WHERE id = $1"
        } else {
            "UPDATE articles SET status = 'archived', updated_at = NOW() WHERE id = $1"
        };

        let result = sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete article: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Article {} not found", id)));
        }

        tracing::info!(%id, force, "Article removed");
        Ok(force)
    }
}
