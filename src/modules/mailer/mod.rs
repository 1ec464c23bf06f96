//! Outgoing transactional email.
//!
//! `HttpMailer` posts to a JSON mail API; `LogMailer` only logs and is used
//! when no API is configured.

mod http_mailer;

pub use http_mailer::HttpMailer;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::core::config::MailConfig;

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to reach mail API: {0}")]
    Transport(String),

    #[error("Mail API rejected message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Mailer that writes messages to the log instead of delivering them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Mail delivery not configured, message logged only"
        );
        tracing::debug!("Mail body:\n{}", email.text);
        Ok(())
    }
}

/// Pick the mailer matching the configuration
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match (&config.api_url, &config.api_key) {
        (Some(url), Some(key)) => {
            tracing::info!("Mail delivery via {}", url);
            Ok(Arc::new(HttpMailer::new(
                url.clone(),
                key.clone(),
                config.from_email.clone(),
                config.from_name.clone(),
            )?))
        }
        _ => {
            tracing::warn!("MAIL_API_URL not set, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records sent mail; fails every send when `fail` is set
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingMailer {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let email = OutgoingEmail {
            to: "admin@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
            reply_to: None,
        };
        assert!(LogMailer.send(email).await.is_ok());
    }

    #[test]
    fn test_from_config_without_api_uses_log_mailer() {
        let config = MailConfig {
            api_url: None,
            api_key: None,
            from_email: "no-reply@example.com".to_string(),
            from_name: "Blog".to_string(),
            admin_email: "admin@example.com".to_string(),
        };
        assert!(from_config(&config).is_ok());
    }
}
