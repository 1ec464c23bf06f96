use std::sync::Arc;

use minijinja::context;

use crate::modules::mailer::{Mailer, OutgoingEmail};
use crate::shared::templates::render_email;

/// Sends the sign-up confirmation and the admin notification.
///
/// Failures are logged and swallowed: a sign-up is never rolled back
/// because mail could not be delivered.
pub struct NewsletterNotifier {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
    site_title: String,
    site_url: String,
}

impl NewsletterNotifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        admin_email: String,
        site_title: String,
        site_url: String,
    ) -> Self {
        Self {
            mailer,
            admin_email,
            site_title,
            site_url,
        }
    }

    pub async fn welcome(&self, email: &str, name: Option<&str>) {
        let rendered = match render_email(
            "newsletter_welcome",
            context! {
                name => name,
                email => email,
                site_title => &self.site_title,
                site_url => &self.site_url,
            },
        ) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Failed to render newsletter confirmation: {}", e);
                return;
            }
        };

        let message = OutgoingEmail {
            to: email.to_string(),
            subject: format!("Bienvenue dans la newsletter {}", self.site_title),
            html: rendered.html,
            text: rendered.text,
            reply_to: None,
        };

        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!(to = %email, "Newsletter confirmation not delivered: {}", e);
        }
    }

    pub async fn notify_admin(&self, email: &str, name: Option<&str>, active_count: i64) {
        let rendered = match render_email(
            "newsletter_admin",
            context! {
                name => name,
                email => email,
                active_count => active_count,
            },
        ) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Failed to render newsletter notification: {}", e);
                return;
            }
        };

        let message = OutgoingEmail {
            to: self.admin_email.clone(),
            subject: format!("Nouvel abonné newsletter: {}", email),
            html: rendered.html,
            text: rendered.text,
            reply_to: Some(email.to_string()),
        };

        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!("Newsletter admin notification not delivered: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::mailer::testing::RecordingMailer;

    fn notifier(mailer: Arc<RecordingMailer>) -> NewsletterNotifier {
        NewsletterNotifier::new(
            mailer,
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
            "https://mad2moi.com".to_string(),
        )
    }

    #[tokio::test]
    async fn test_welcome_goes_to_subscriber() {
        let mailer = Arc::new(RecordingMailer::default());
        notifier(mailer.clone())
            .welcome("reader@example.com", Some("Awa"))
            .await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "reader@example.com");
        assert!(sent[0].subject.contains("Mad2Moi"));
        assert!(sent[0].text.contains("https://mad2moi.com"));
    }

    #[tokio::test]
    async fn test_admin_notification_carries_count_and_reply_to() {
        let mailer = Arc::new(RecordingMailer::default());
        notifier(mailer.clone())
            .notify_admin("reader@example.com", None, 42)
            .await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@example.com");
        assert_eq!(sent[0].reply_to.as_deref(), Some("reader@example.com"));
        assert!(sent[0].text.contains("Abonnés actifs: 42"));
        assert!(sent[0].text.contains("Non spécifié"));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let mailer = Arc::new(RecordingMailer::failing());
        let n = notifier(mailer.clone());
        n.welcome("reader@example.com", None).await;
        n.notify_admin("reader@example.com", None, 1).await;
        assert!(mailer.sent().is_empty());
    }
}
