use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::chat::dtos::VisitorMessageDto;
use crate::features::chat::models::{
    ChatMessage, Conversation, ConversationStatus, ConversationSummary, SenderRole,
};
use crate::features::settings::services::SettingsService;
use crate::modules::llm::ChatCompletion;

const CONVERSATION_COLUMNS: &str =
    "id, session_id, visitor_name, visitor_email, status, last_message_at, created_at";

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_role, sender_name, body, created_at";

/// Service for support-chat conversations.
///
/// Storage operations live here; assistant replies are in `assistant.rs`.
pub struct ChatService {
    pub(super) pool: PgPool,
    pub(super) settings: Arc<SettingsService>,
    pub(super) llm: Option<Arc<dyn ChatCompletion>>,
    pub(super) site_title: String,
}

impl ChatService {
    pub fn new(
        pool: PgPool,
        settings: Arc<SettingsService>,
        llm: Option<Arc<dyn ChatCompletion>>,
        site_title: String,
    ) -> Self {
        Self {
            pool,
            settings,
            llm,
            site_title,
        }
    }

    /// Store a visitor message, opening the session's conversation on first contact
    pub async fn post_visitor_message(
        &self,
        dto: VisitorMessageDto,
    ) -> Result<(Conversation, ChatMessage)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            INSERT INTO chat_conversations (session_id, visitor_name, visitor_email)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE
            SET visitor_name = COALESCE(EXCLUDED.visitor_name, chat_conversations.visitor_name),
                visitor_email = COALESCE(EXCLUDED.visitor_email, chat_conversations.visitor_email),
                status = 'open',
                last_message_at = NOW()
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(&dto.session_id)
        .bind(&dto.visitor_name)
        .bind(&dto.visitor_email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to open conversation: {:?}", e);
            AppError::Database(e)
        })?;

        let message = sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (conversation_id, sender_role, sender_name, body)
            VALUES ($1, 'user', $2, $3)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(conversation.id)
        .bind(&conversation.visitor_name)
        .bind(&dto.message)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store visitor message: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit visitor message: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::debug!(conversation = %conversation.id, "Visitor message stored");
        Ok((conversation, message))
    }

    /// Messages of a visitor session; empty when the session has not written yet
    pub async fn session_messages(
        &self,
        session_id: &str,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT m.id, m.conversation_id, m.sender_role, m.sender_name, m.body, m.created_at
            FROM chat_messages m
            JOIN chat_conversations c ON c.id = m.conversation_id
            WHERE c.session_id = $1
              AND ($2::timestamptz IS NULL OR m.created_at > $2)
            ORDER BY m.created_at ASC, m.id ASC
            "#,
        )
        .bind(session_id)
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list session messages: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Inbox, most recent activity first
    pub async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<ConversationSummary>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_conversations WHERE ($1::conversation_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count conversations: {:?}", e);
            AppError::Database(e)
        })?;

        let conversations = sqlx::query_as::<_, ConversationSummary>(
            r#"
            SELECT c.id, c.session_id, c.visitor_name, c.visitor_email, c.status,
                   c.last_message_at, c.created_at,
                   last.body AS last_message,
                   last.sender_role AS last_sender_role,
                   (SELECT COUNT(*) FROM chat_messages m WHERE m.conversation_id = c.id)
                       AS message_count
            FROM chat_conversations c
            LEFT JOIN LATERAL (
                SELECT body, sender_role
                FROM chat_messages m
                WHERE m.conversation_id = c.id
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT 1
            ) last ON TRUE
            WHERE ($1::conversation_status IS NULL OR c.status = $1)
            ORDER BY c.last_message_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list conversations: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((conversations, total))
    }

    pub async fn get_conversation(&self, id: Uuid) -> Result<Conversation> {
        sqlx::query_as::<_, Conversation>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM chat_conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get conversation: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", id)))
    }

    /// Messages of a conversation in chronological order
    pub async fn messages(
        &self,
        conversation_id: Uuid,
        after: Option<DateTime<Utc>>,
    ) -> Result<Vec<ChatMessage>> {
        self.get_conversation(conversation_id).await?;

        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE conversation_id = $1
              AND ($2::timestamptz IS NULL OR created_at > $2)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id)
        .bind(after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list messages: {:?}", e);
            AppError::Database(e)
        })
    }

    /// The latest `limit` messages, oldest first
    pub(super) async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM (
                SELECT {MESSAGE_COLUMNS}
                FROM chat_messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(conversation_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load conversation context: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Role of the newest message, `None` for an empty conversation
    /// Lock the conversation row for the rest of the transaction
    async fn lock_conversation(conn: &mut PgConnection, conversation_id: Uuid) -> Result<()> {
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM chat_conversations WHERE id = $1 FOR UPDATE")
                .bind(conversation_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to lock conversation: {:?}", e);
                    AppError::Database(e)
                })?;

        locked.map(|_| ()).ok_or_else(|| {
            AppError::NotFound(format!("Conversation {} not found", conversation_id))
        })
    }

    async fn latest_sender(
        conn: &mut PgConnection,
        conversation_id: Uuid,
    ) -> Result<Option<SenderRole>> {
        sqlx::query_scalar(
            r#"
            SELECT sender_role
            FROM chat_messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read latest message: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn insert_message(
        conn: &mut PgConnection,
        conversation_id: Uuid,
        role: SenderRole,
        sender_name: &str,
        body: &str,
    ) -> Result<ChatMessage> {
        sqlx::query("UPDATE chat_conversations SET last_message_at = NOW() WHERE id = $1")
            .bind(conversation_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                tracing::error!("Failed to touch conversation: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (conversation_id, sender_role, sender_name, body)
            VALUES ($1, $2, $3, $4)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(conversation_id)
        .bind(role)
        .bind(sender_name)
        .bind(body)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store message: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Append a site-side message (admin or assistant) to a conversation
    pub async fn add_message(
        &self,
        conversation_id: Uuid,
        role: SenderRole,
        sender_name: &str,
        body: &str,
    ) -> Result<ChatMessage> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Self::lock_conversation(&mut tx, conversation_id).await?;
        let message =
            Self::insert_message(&mut tx, conversation_id, role, sender_name, body).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit message: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(message)
    }

    /// Append a site-side message only while the visitor has the last word.
    ///
    /// The check and the insert run under the conversation row lock, so
    /// concurrent callers store at most one answer.
    pub(super) async fn answer_visitor(
        &self,
        conversation_id: Uuid,
        role: SenderRole,
        sender_name: &str,
        body: &str,
    ) -> Result<Option<ChatMessage>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Self::lock_conversation(&mut tx, conversation_id).await?;
        if Self::latest_sender(&mut tx, conversation_id).await? != Some(SenderRole::User) {
            return Ok(None);
        }
        let message =
            Self::insert_message(&mut tx, conversation_id, role, sender_name, body).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit message: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Some(message))
    }

    pub async fn set_status(&self, id: Uuid, status: ConversationStatus) -> Result<Conversation> {
        let conversation = sqlx::query_as::<_, Conversation>(&format!(
            r#"
            UPDATE chat_conversations
            SET status = $2
            WHERE id = $1
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update conversation status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Conversation {} not found", id)))?;

        tracing::info!(%id, ?status, "Conversation status changed");
        Ok(conversation)
    }
}
