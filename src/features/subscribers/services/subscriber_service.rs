use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::subscribers::dtos::{AdminSubscriberQuery, SubscribeDto};
use crate::features::subscribers::models::{Subscriber, SubscriberStatus};
use crate::features::subscribers::services::NewsletterNotifier;
use crate::shared::text::like_pattern;

const DEFAULT_SOURCE: &str = "site_web";

const SUBSCRIBER_COLUMNS: &str = "id, email, name, source, status, created_at, updated_at";

fn push_admin_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AdminSubscriberQuery) {
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(term) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Service for newsletter subscriptions
pub struct SubscriberService {
    pool: PgPool,
    notifier: NewsletterNotifier,
}

impl SubscriberService {
    pub fn new(pool: PgPool, notifier: NewsletterNotifier) -> Self {
        Self { pool, notifier }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>> {
        sqlx::query_as::<_, Subscriber>(&format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up subscriber: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Sign up an address, or reactivate it after an earlier unsubscribe.
    ///
    /// The confirmation and admin notification go out once the row is stored.
    pub async fn subscribe(&self, dto: SubscribeDto) -> Result<Subscriber> {
        let subscriber = match self.find_by_email(&dto.email).await? {
            Some(existing) if existing.status == SubscriberStatus::Active => {
                return Err(AppError::Conflict(
                    "This email is already subscribed".to_string(),
                ));
            }
            Some(existing) => {
                let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
                    r#"
                    UPDATE subscribers
                    SET status = 'active', name = COALESCE($2, name), updated_at = NOW()
                    WHERE id = $1
                    RETURNING {SUBSCRIBER_COLUMNS}
                    "#
                ))
                .bind(existing.id)
                .bind(&dto.name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to reactivate subscriber: {:?}", e);
                    AppError::Database(e)
                })?;
                tracing::info!(id = %subscriber.id, "Subscriber reactivated");
                subscriber
            }
            None => {
                let subscriber = sqlx::query_as::<_, Subscriber>(&format!(
                    r#"
                    INSERT INTO subscribers (email, name, source)
                    VALUES ($1, $2, $3)
                    RETURNING {SUBSCRIBER_COLUMNS}
                    "#
                ))
                .bind(&dto.email)
                .bind(&dto.name)
                .bind(dto.source.as_deref().unwrap_or(DEFAULT_SOURCE))
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to create subscriber: {:?}", e);
                    AppError::from_unique_violation(e, "This email is already subscribed")
                })?;
                tracing::info!(id = %subscriber.id, "New subscriber");
                subscriber
            }
        };

        self.notifier
            .welcome(&subscriber.email, subscriber.name.as_deref())
            .await;

        let active_count = self.active_count().await.unwrap_or_default();
        self.notifier
            .notify_admin(&subscriber.email, subscriber.name.as_deref(), active_count)
            .await;

        Ok(subscriber)
    }

    pub async fn active_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM subscribers WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count subscribers: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Mark an address as unsubscribed; repeating the request is harmless
    pub async fn unsubscribe(&self, email: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE subscribers
            SET status = 'unsubscribed', updated_at = NOW()
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to unsubscribe: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Subscriber not found".to_string()));
        }

        tracing::info!("Subscriber unsubscribed");
        Ok(())
    }

    pub async fn list_admin(
        &self,
        query: AdminSubscriberQuery,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Subscriber>, i64)> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM subscribers WHERE 1 = 1");
        push_admin_filters(&mut count_qb, &query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count subscribers: {:?}", e);
                AppError::Database(e)
            })?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE 1 = 1"
        ));
        push_admin_filters(&mut qb, &query);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let subscribers = qb
            .build_query_as::<Subscriber>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list subscribers: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((subscribers, total))
    }

    pub async fn set_status(&self, id: Uuid, status: SubscriberStatus) -> Result<Subscriber> {
        sqlx::query_as::<_, Subscriber>(&format!(
            r#"
            UPDATE subscribers
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {SUBSCRIBER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update subscriber status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Subscriber {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete subscriber: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Subscriber {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::mailer::testing::RecordingMailer;
    use std::sync::Arc;

    fn service(pool: PgPool, mailer: Arc<RecordingMailer>) -> SubscriberService {
        let notifier = NewsletterNotifier::new(
            mailer,
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
            "https://blog.example.com".to_string(),
        );
        SubscriberService::new(pool, notifier)
    }

    fn subscribe_dto(email: &str) -> SubscribeDto {
        SubscribeDto {
            email: email.to_string(),
            name: Some("Awa".to_string()),
            source: None,
        }
        .normalized()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_subscribe_mails_reader_and_admin(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(pool, mailer.clone());

        let subscriber = service
            .subscribe(subscribe_dto("Awa@Example.com"))
            .await
            .unwrap();

        assert_eq!(subscriber.email, "awa@example.com");
        assert_eq!(subscriber.source, "site_web");
        assert_eq!(subscriber.status, SubscriberStatus::Active);
        assert_eq!(service.active_count().await.unwrap(), 1);

        let recipients: Vec<String> = mailer.sent().into_iter().map(|m| m.to).collect();
        assert_eq!(recipients, ["awa@example.com", "admin@example.com"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_active_subscriber_conflicts_then_reactivates(pool: PgPool) {
        let mailer = Arc::new(RecordingMailer::default());
        let service = service(pool, mailer);

        let first = service
            .subscribe(subscribe_dto("awa@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            service.subscribe(subscribe_dto("awa@example.com")).await,
            Err(AppError::Conflict(_))
        ));

        service.unsubscribe("AWA@example.com").await.unwrap();
        assert_eq!(service.active_count().await.unwrap(), 0);
        service.unsubscribe("awa@example.com").await.unwrap();

        let again = service
            .subscribe(subscribe_dto("awa@example.com"))
            .await
            .unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.status, SubscriberStatus::Active);
        assert_eq!(service.active_count().await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_mail_failure_does_not_fail_subscription(pool: PgPool) {
        let service = service(pool, Arc::new(RecordingMailer::failing()));
        assert!(service
            .subscribe(subscribe_dto("awa@example.com"))
            .await
            .is_ok());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unknown_address_cannot_unsubscribe(pool: PgPool) {
        let service = service(pool, Arc::new(RecordingMailer::default()));
        assert!(matches!(
            service.unsubscribe("nobody@example.com").await,
            Err(AppError::NotFound(_))
        ));
    }
}
