use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::{Comment, CommentStatus};

/// Comment as shown to readers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub article_slug: String,
    pub author_name: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            article_slug: c.article_slug,
            author_name: c.author_name,
            content: c.content,
            status: c.status,
            created_at: c.created_at,
        }
    }
}

/// Comment with the moderation details only the back-office sees
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCommentDto {
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

impl From<Comment> for AdminCommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            article_id: c.article_id,
            article_slug: c.article_slug,
            author_name: c.author_name,
            author_email: c.author_email,
            content: c.content,
            status: c.status,
            ip_address: c.ip_address,
            user_agent: c.user_agent,
            notify_replies: c.notify_replies,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query for the public comment thread of an article
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CommentThreadQuery {
    /// Slug of the article (required)
    pub article_slug: Option<String>,
}

/// Filters for the moderation queue
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AdminCommentQuery {
    pub status: Option<CommentStatus>,
    pub article_slug: Option<String>,
}

/// Request DTO for posting a comment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(length(min = 1, message = "Article slug is required"))]
    pub article_slug: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub author_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub author_email: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Comment must be 1-5000 characters"))]
    pub content: String,

    #[serde(default)]
    pub notify_replies: bool,
}

impl CreateCommentDto {
    /// Copy with surrounding whitespace removed and a blank email dropped
    pub fn trimmed(self) -> Self {
        Self {
            article_slug: self.article_slug.trim().to_string(),
            author_name: self.author_name.trim().to_string(),
            author_email: self
                .author_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            content: self.content.trim().to_string(),
            notify_replies: self.notify_replies,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCommentStatusDto {
    pub status: CommentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_whitespace_only_fields_fail_validation() {
        let dto: CreateCommentDto = serde_json::from_value(json!({
            "article_slug": "mon-article",
            "author_name": "   ",
            "content": "  ",
            "author_email": " "
        }))
        .unwrap();
        let dto = dto.trimmed();
        assert!(dto.author_email.is_none());

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("author_name"));
        assert!(fields.contains_key("content"));
        assert!(!fields.contains_key("author_email"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let dto: CreateCommentDto = serde_json::from_value(json!({
            "article_slug": "a",
            "author_name": "Awa",
            "author_email": "not-an-email",
            "content": "Merci !"
        }))
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_public_dto_hides_moderation_details() {
        let comment = Comment {
            id: Uuid::new_v4(),
            article_id: Uuid::new_v4(),
            article_slug: "a".to_string(),
            author_name: "Awa".to_string(),
            author_email: Some("awa@example.com".to_string()),
            content: "Merci".to_string(),
            status: CommentStatus::Approved,
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: None,
            notify_replies: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_value(CommentResponseDto::from(comment)).unwrap();
        assert!(body.get("author_email").is_none());
        assert!(body.get("ip_address").is_none());
        assert_eq!(body["status"], "approved");
    }
}
