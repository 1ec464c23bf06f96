use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Moderation state of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "comment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
    Spam,
}

impl CommentStatus {
    /// Status given to a new reader comment
    pub fn initial(auto_approve: bool) -> Self {
        if auto_approve {
            CommentStatus::Approved
        } else {
            CommentStatus::Pending
        }
    }
}

/// Database model for comment
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub article_slug: String,
    pub author_name: String,
    pub author_email: Option<String>,
    pub content: String,
    pub status: CommentStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub notify_replies: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status() {
        assert_eq!(CommentStatus::initial(true), CommentStatus::Approved);
        assert_eq!(CommentStatus::initial(false), CommentStatus::Pending);
    }
}
