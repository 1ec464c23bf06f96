use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::contact::handlers;
use crate::features::contact::services::ContactService;

pub fn routes(service: Arc<ContactService>) -> Router {
    Router::new()
        .route("/api/contact", post(handlers::send_contact))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::mailer::testing::RecordingMailer;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(mailer: Arc<RecordingMailer>) -> TestServer {
        let service = ContactService::new(
            mailer,
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
        );
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    fn form() -> Value {
        json!({
            "firstName": "Awa",
            "email": "awa@example.com",
            "subject": "Question",
            "message": "Bonjour"
        })
    }

    #[tokio::test]
    async fn test_contact_sends_mail() {
        let mailer = Arc::new(RecordingMailer::default());
        let response = server(mailer.clone()).post("/api/contact").json(&form()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_contact_rejects_bad_phone() {
        let mailer = Arc::new(RecordingMailer::default());
        let mut body = form();
        body["phone"] = json!("call me");

        server(mailer.clone())
            .post("/api/contact")
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_contact_rejects_missing_subject() {
        let mut body = form();
        body["subject"] = json!("");

        server(Arc::default())
            .post("/api/contact")
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contact_mail_failure_is_bad_gateway() {
        let response = server(Arc::new(RecordingMailer::failing()))
            .post("/api/contact")
            .json(&form())
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }
}
