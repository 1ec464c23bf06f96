use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::subscribers::models::{Subscriber, SubscriberStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriberResponseDto {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: String,
    pub status: SubscriberStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponseDto {
    fn from(s: Subscriber) -> Self {
        Self {
            id: s.id,
            email: s.email,
            name: s.name,
            source: s.source,
            status: s.status,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Request DTO for a newsletter sign-up
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubscribeDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// Where the sign-up form lives; defaults to `site_web`
    #[validate(length(max = 50, message = "Source must be at most 50 characters"))]
    pub source: Option<String>,
}

impl SubscribeDto {
    /// Lowercased email, trimmed name and source with blanks dropped
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            email: self.email.trim().to_lowercase(),
            name: clean(self.name),
            source: clean(self.source),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UnsubscribeDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Public subscriber count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriberCountDto {
    pub count: i64,
}

/// Filters for the back-office subscriber list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AdminSubscriberQuery {
    pub status: Option<SubscriberStatus>,
    /// Case-insensitive match on email or name
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSubscriberStatusDto {
    pub status: SubscriberStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalized_lowercases_email() {
        let dto: SubscribeDto = serde_json::from_value(json!({
            "email": "  Reader@Example.COM ",
            "name": "  ",
        }))
        .unwrap();
        let dto = dto.normalized();
        assert_eq!(dto.email, "reader@example.com");
        assert!(dto.name.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        for email in ["", "reader", "reader@", "a b@example.com"] {
            let dto: SubscribeDto = serde_json::from_value(json!({ "email": email })).unwrap();
            assert!(dto.normalized().validate().is_err(), "{}", email);
        }
    }
}
