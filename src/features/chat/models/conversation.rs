use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "conversation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    Closed,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sender_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// Site visitor
    User,
    Admin,
    Assistant,
}

/// Chat thread, one per visitor session
#[derive(Debug, Clone, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub session_id: String,
    pub visitor_name: Option<String>,
    pub visitor_email: Option<String>,
    pub status: ConversationStatus,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub sender_name: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Conversation with its latest message, for the back-office inbox
#[derive(Debug, Clone, FromRow)]
pub struct ConversationSummary {
    #[sqlx(flatten)]
    pub conversation: Conversation,
    pub last_message: Option<String>,
    pub last_sender_role: Option<SenderRole>,
    pub message_count: i64,
}
