use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::PHONE_REGEX;

/// Contact form as posted by the site; the sender name may arrive as
/// `name` or `firstName`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContactRequestDto {
    pub name: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// Normalised contact message, ready to validate and send
#[derive(Debug, Clone, Validate)]
pub struct ContactMessage {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number format"))]
    pub phone: Option<String>,

    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<ContactRequestDto> for ContactMessage {
    fn from(dto: ContactRequestDto) -> Self {
        Self {
            name: clean(dto.first_name)
                .or_else(|| clean(dto.name))
                .unwrap_or_default(),
            email: clean(dto.email).unwrap_or_default(),
            phone: clean(dto.phone),
            subject: clean(dto.subject).unwrap_or_default(),
            message: clean(dto.message).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> ContactMessage {
        serde_json::from_value::<ContactRequestDto>(value)
            .unwrap()
            .into()
    }

    #[test]
    fn test_first_name_preferred_over_name() {
        let msg = message(json!({"firstName": "Awa", "name": "Other"}));
        assert_eq!(msg.name, "Awa");

        let msg = message(json!({"firstName": " ", "name": "Moussa"}));
        assert_eq!(msg.name, "Moussa");
    }

    #[test]
    fn test_complete_message_is_valid() {
        let msg = message(json!({
            "name": "Awa",
            "email": "awa@example.com",
            "phone": "+221 77 123 45 67",
            "subject": "Partenariat",
            "message": "Bonjour"
        }));
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported() {
        let errors = message(json!({})).validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "email", "subject", "message"] {
            assert!(fields.contains_key(field), "{}", field);
        }
        assert!(!fields.contains_key("phone"));
    }

    #[test]
    fn test_bad_phone_rejected() {
        let msg = message(json!({
            "name": "Awa",
            "email": "awa@example.com",
            "phone": "12ab",
            "subject": "s",
            "message": "m"
        }));
        let errors = msg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("phone"));
    }
}
