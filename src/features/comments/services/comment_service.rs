use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::dtos::{AdminCommentQuery, CreateCommentDto};
use crate::features::comments::models::{Comment, CommentStatus};

/// Comment columns with the article's current slug; expects `c` joined to `a`
const COMMENT_COLUMNS: &str = r#"
    c.id, c.article_id, a.slug AS article_slug, c.author_name, c.author_email,
    c.content, c.status, c.ip_address, c.user_agent, c.notify_replies,
    c.created_at, c.updated_at
"#;

const COMMENT_SOURCE: &str = "comments c JOIN articles a ON a.id = c.article_id";

fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AdminCommentQuery) {
    if let Some(status) = query.status {
        qb.push(" AND c.status = ").push_bind(status);
    }
    if let Some(slug) = query.article_slug.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND a.slug = ").push_bind(slug.to_string());
    }
}

/// Service for reader comments and their moderation
pub struct CommentService {
    pool: PgPool,
    auto_approve: bool,
}

impl CommentService {
    pub fn new(pool: PgPool, auto_approve: bool) -> Self {
        Self { pool, auto_approve }
    }

    /// Approved comments of a published article, oldest first
    pub async fn list_approved(
        &self,
        article_slug: &str,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Comment>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*) FROM {COMMENT_SOURCE}
            WHERE a.slug = $1 AND a.status = 'published' AND c.status = 'approved'
            "#
        ))
        .bind(article_slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count comments: {:?}", e);
            AppError::Database(e)
        })?;

        let comments = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM {COMMENT_SOURCE}
            WHERE a.slug = $1 AND a.status = 'published' AND c.status = 'approved'
            ORDER BY c.created_at ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(article_slug)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((comments, total))
    }

    /// Post a reader comment on a published article
    pub async fn create(
        &self,
        dto: CreateCommentDto,
        ip_address: &str,
        user_agent: &str,
    ) -> Result<Comment> {
        let article_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM articles WHERE slug = $1 AND status = 'published'",
        )
        .bind(&dto.article_slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up article for comment: {:?}", e);
            AppError::Database(e)
        })?;

        let article_id = article_id.ok_or_else(|| {
            AppError::NotFound(format!("Article '{}' not found", dto.article_slug))
        })?;

        let status = CommentStatus::initial(self.auto_approve);

        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH c AS (
                INSERT INTO comments (
                    article_id, author_name, author_email, content, status,
                    ip_address, user_agent, notify_replies
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c JOIN articles a ON a.id = c.article_id
            "#
        ))
        .bind(article_id)
        .bind(&dto.author_name)
        .bind(&dto.author_email)
        .bind(&dto.content)
        .bind(status)
        .bind(ip_address)
        .bind(user_agent)
        .bind(dto.notify_replies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            id = %comment.id,
            article = %comment.article_slug,
            ?status,
            "Comment received"
        );
        Ok(comment)
    }

    /// Moderation queue, newest first
    pub async fn list_admin(
        &self,
        query: AdminCommentQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Comment>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) FROM {COMMENT_SOURCE} WHERE 1 = 1"
        ));
        push_admin_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count comments: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMMENT_COLUMNS} FROM {COMMENT_SOURCE} WHERE 1 = 1"
        ));
        push_admin_filters(&mut qb, &query);
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let comments = qb
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list comments: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((comments, total))
    }

    pub async fn set_status(&self, id: Uuid, status: CommentStatus) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH c AS (
                UPDATE comments
                SET status = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {COMMENT_COLUMNS}
            FROM c JOIN articles a ON a.id = c.article_id
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update comment status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

        tracing::info!(%id, ?status, "Comment moderated");
        Ok(comment)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Comment {} not found", id)));
        }
        Ok(())
    }
}
