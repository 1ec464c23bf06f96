use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;

/// Aggregated counts over the blog's content and audience
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn overview(&self) -> Result<AdminStatsDto> {
        let articles = sqlx::query_as::<_, ArticleStatsDto>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'draft') AS draft,
                COUNT(*) FILTER (WHERE status = 'published') AS published,
                COUNT(*) FILTER (WHERE status = 'archived') AS archived,
                COUNT(*) FILTER (WHERE is_featured) AS featured,
                COALESCE(SUM(view_count), 0)::BIGINT AS total_views
            FROM articles
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count articles: {:?}", e);
            AppError::Database(e)
        })?;

        let categories = sqlx::query_as::<_, CategoryStatsDto>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_active) AS active
            FROM categories
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count categories: {:?}", e);
            AppError::Database(e)
        })?;

        let comments = sqlx::query_as::<_, CommentStatsDto>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'approved') AS approved,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected,
                COUNT(*) FILTER (WHERE status = 'spam') AS spam
            FROM comments
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count comments: {:?}", e);
            AppError::Database(e)
        })?;

        let subscribers = sqlx::query_as::<_, SubscriberStatsDto>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'active') AS active,
                COUNT(*) FILTER (WHERE status = 'unsubscribed') AS unsubscribed
            FROM subscribers
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count subscribers: {:?}", e);
            AppError::Database(e)
        })?;

        let chat = sqlx::query_as::<_, ChatStatsDto>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM chat_conversations) AS total_conversations,
                (SELECT COUNT(*) FROM chat_conversations WHERE status = 'open') AS open_conversations,
                (SELECT COUNT(*) FROM chat_messages
                 WHERE sender_role = 'user'
                   AND created_at >= NOW() - INTERVAL '24 hours') AS messages_last_24h
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count chat activity: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(AdminStatsDto {
            articles,
            categories,
            comments,
            subscribers,
            chat,
        })
    }
}
