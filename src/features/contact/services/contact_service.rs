use std::sync::Arc;

use minijinja::context;

use crate::core::error::{AppError, Result};
use crate::features::contact::dtos::ContactMessage;
use crate::modules::mailer::{Mailer, OutgoingEmail};
use crate::shared::templates::render_email;

/// Relays contact form messages to the admin mailbox
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
    site_title: String,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: String, site_title: String) -> Self {
        Self {
            mailer,
            admin_email,
            site_title,
        }
    }

    fn compose(&self, msg: &ContactMessage) -> Result<OutgoingEmail> {
        let message_lines: Vec<&str> = msg.message.lines().collect();
        let rendered = render_email(
            "contact",
            context! {
                name => &msg.name,
                email => &msg.email,
                phone => &msg.phone,
                subject => &msg.subject,
                message => &msg.message,
                message_lines => message_lines,
                site_title => &self.site_title,
            },
        )
        .map_err(|e| AppError::Internal(format!("Failed to render contact email: {}", e)))?;

        Ok(OutgoingEmail {
            to: self.admin_email.clone(),
            subject: format!("Contact Blog: {}", msg.subject),
            html: rendered.html,
            text: rendered.text,
            reply_to: Some(msg.email.clone()),
        })
    }

    pub async fn send(&self, msg: ContactMessage) -> Result<()> {
        let email = self.compose(&msg)?;

        self.mailer.send(email).await.map_err(|e| {
            tracing::error!("Failed to deliver contact message: {}", e);
            AppError::ExternalServiceError("Failed to send message".to_string())
        })?;

        tracing::info!(from = %msg.email, "Contact message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::mailer::testing::RecordingMailer;

    fn msg() -> ContactMessage {
        ContactMessage {
            name: "Awa <b>".to_string(),
            email: "awa@example.com".to_string(),
            phone: None,
            subject: "Partenariat".to_string(),
            message: "Bonjour,\nje vous écris.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_composes_admin_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let service = ContactService::new(
            mailer.clone(),
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
        );

        service.send(msg()).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@example.com");
        assert_eq!(sent[0].subject, "Contact Blog: Partenariat");
        assert_eq!(sent[0].reply_to.as_deref(), Some("awa@example.com"));
        assert!(sent[0].html.contains("Awa &lt;b&gt;"));
        assert!(sent[0].html.contains("Bonjour,<br>"));
        assert!(sent[0].text.contains("je vous écris."));
        assert!(!sent[0].text.contains("Téléphone"));
    }

    #[tokio::test]
    async fn test_delivery_failure_maps_to_bad_gateway() {
        let service = ContactService::new(
            Arc::new(RecordingMailer::failing()),
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
        );

        let result = service.send(msg()).await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }
}
