use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{MailError, Mailer, OutgoingEmail};

#[derive(Debug, Serialize)]
struct Sender<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: Sender<'a>,
    #[serde(flatten)]
    email: &'a OutgoingEmail,
}

/// Delivers mail through a transactional mail HTTP API with a bearer key
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl HttpMailer {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(
        api_url: String,
        api_key: String,
        from_email: String,
        from_name: String,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            from_email,
            from_name,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let body = SendRequest {
            from: Sender {
                email: &self.from_email,
                name: &self.from_name,
            },
            email: &email,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected(format!("HTTP {} - {}", status, body)));
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_flattens_email() {
        let email = OutgoingEmail {
            to: "reader@example.com".to_string(),
            subject: "Bienvenue".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
            reply_to: Some("admin@example.com".to_string()),
        };
        let body = serde_json::to_value(SendRequest {
            from: Sender {
                email: "no-reply@example.com",
                name: "Blog",
            },
            email: &email,
        })
        .unwrap();

        assert_eq!(body["from"]["email"], "no-reply@example.com");
        assert_eq!(body["to"], "reader@example.com");
        assert_eq!(body["reply_to"], "admin@example.com");
    }
}
