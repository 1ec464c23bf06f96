use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::subscribers::handlers;
use crate::features::subscribers::services::SubscriberService;

/// Public newsletter routes
pub fn routes(service: Arc<SubscriberService>) -> Router {
    Router::new()
        .route(
            "/api/newsletter",
            get(handlers::subscriber_count).post(handlers::subscribe),
        )
        .route("/api/newsletter/unsubscribe", post(handlers::unsubscribe))
        .with_state(service)
}

/// Back-office subscriber routes
pub fn admin_routes(service: Arc<SubscriberService>) -> Router {
    Router::new()
        .route("/api/admin/subscribers", get(handlers::admin_list_subscribers))
        .route(
            "/api/admin/subscribers/{id}/status",
            put(handlers::update_subscriber_status),
        )
        .route(
            "/api/admin/subscribers/{id}",
            delete(handlers::delete_subscriber),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscribers::services::NewsletterNotifier;
    use crate::modules::mailer::testing::RecordingMailer;
    use crate::shared::test_helpers::lazy_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn service(mailer: Arc<RecordingMailer>) -> Arc<SubscriberService> {
        let notifier = NewsletterNotifier::new(
            mailer,
            "admin@example.com".to_string(),
            "Mad2Moi".to_string(),
            "https://mad2moi.com".to_string(),
        );
        Arc::new(SubscriberService::new(lazy_pool(), notifier))
    }

    #[tokio::test]
    async fn test_subscribe_rejects_invalid_email_without_mailing() {
        let mailer = Arc::new(RecordingMailer::default());
        let server = TestServer::new(routes(service(mailer.clone()))).unwrap();

        let response = server
            .post("/api/newsletter")
            .json(&json!({"email": "not-an-email", "name": "Awa"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_requires_email() {
        let server = TestServer::new(routes(service(Arc::default()))).unwrap();
        server
            .post("/api/newsletter")
            .json(&json!({"name": "Awa"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsubscribe_rejects_invalid_email() {
        let server = TestServer::new(routes(service(Arc::default()))).unwrap();
        server
            .post("/api/newsletter/unsubscribe")
            .json(&json!({"email": "nope"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let server = TestServer::new(admin_routes(service(Arc::default()))).unwrap();
        server
            .get("/api/admin/subscribers")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
