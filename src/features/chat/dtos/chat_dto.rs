use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::chat::models::{
    ChatMessage, Conversation, ConversationStatus, ConversationSummary, SenderRole,
};

/// Characters of the last message shown in the inbox
const PREVIEW_LENGTH: usize = 100;

/// Request DTO for a visitor message
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VisitorMessageDto {
    /// Identifier chosen by the chat widget, stable for the visitor's session
    #[validate(length(min = 1, max = 100, message = "session_id must be 1-100 characters"))]
    pub session_id: String,

    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub visitor_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub visitor_email: Option<String>,
}

impl VisitorMessageDto {
    pub fn trimmed(self) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            session_id: self.session_id.trim().to_string(),
            message: self.message.trim().to_string(),
            visitor_name: clean(self.visitor_name),
            visitor_email: clean(self.visitor_email),
        }
    }
}

/// Request DTO for a back-office reply
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

/// Inbox filter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ConversationQuery {
    pub status: Option<ConversationStatus>,
}

/// Polling query: only messages strictly newer than `after`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MessagesQuery {
    /// RFC 3339 timestamp of the newest message already shown
    pub after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageDto {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_role: SenderRole,
    pub sender_name: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_role: m.sender_role,
            sender_name: m.sender_name,
            message: m.body,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationDto {
    pub id: Uuid,
    pub session_id: String,
    pub visitor_name: Option<String>,
    pub visitor_email: Option<String>,
    pub status: ConversationStatus,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationDto {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            session_id: c.session_id,
            visitor_name: c.visitor_name,
            visitor_email: c.visitor_email,
            status: c.status,
            last_message_at: c.last_message_at,
            created_at: c.created_at,
        }
    }
}

/// Inbox entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationSummaryDto {
    #[serde(flatten)]
    pub conversation: ConversationDto,
    /// Start of the latest message
    pub last_message_preview: Option<String>,
    pub last_sender_role: Option<SenderRole>,
    pub message_count: i64,
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LENGTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_LENGTH).collect();
    format!("{}...", cut.trim_end())
}

impl From<ConversationSummary> for ConversationSummaryDto {
    fn from(s: ConversationSummary) -> Self {
        Self {
            conversation: s.conversation.into(),
            last_message_preview: s.last_message.as_deref().map(preview),
            last_sender_role: s.last_sender_role,
            message_count: s.message_count,
        }
    }
}

/// Reply to a visitor message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorMessageResponseDto {
    pub conversation_id: Uuid,
    pub message: ChatMessageDto,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateConversationStatusDto {
    pub status: ConversationStatus,
}

/// Draft reply proposed to the back-office, not stored
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestionDto {
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatStatusDto {
    /// A model provider is configured
    pub llm_available: bool,
    pub auto_reply_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AutoReplyDto {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visitor_message_trimmed_and_validated() {
        let dto: VisitorMessageDto = serde_json::from_value(json!({
            "session_id": " s-1 ",
            "message": "  Bonjour  ",
            "visitor_name": " ",
            "visitor_email": ""
        }))
        .unwrap();
        let dto = dto.trimmed();
        assert_eq!(dto.session_id, "s-1");
        assert_eq!(dto.message, "Bonjour");
        assert!(dto.visitor_name.is_none());
        assert!(dto.visitor_email.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_blank_message_rejected() {
        let dto: VisitorMessageDto =
            serde_json::from_value(json!({"session_id": "s", "message": "   "})).unwrap();
        assert!(dto.trimmed().validate().is_err());
    }

    #[test]
    fn test_preview_truncates_long_messages() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(150);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), PREVIEW_LENGTH + 3);
    }

    #[test]
    fn test_summary_flattens_conversation() {
        let summary = ConversationSummary {
            conversation: Conversation {
                id: Uuid::new_v4(),
                session_id: "s-1".to_string(),
                visitor_name: Some("Awa".to_string()),
                visitor_email: None,
                status: ConversationStatus::Open,
                last_message_at: Utc::now(),
                created_at: Utc::now(),
            },
            last_message: Some("Bonjour".to_string()),
            last_sender_role: Some(SenderRole::User),
            message_count: 3,
        };
        let body = serde_json::to_value(ConversationSummaryDto::from(summary)).unwrap();
        assert_eq!(body["session_id"], "s-1");
        assert_eq!(body["status"], "open");
        assert_eq!(body["last_message_preview"], "Bonjour");
        assert_eq!(body["last_sender_role"], "user");
        assert_eq!(body["message_count"], 3);
    }
}
