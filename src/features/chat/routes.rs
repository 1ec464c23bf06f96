use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::chat::handlers;
use crate::features::chat::services::ChatService;

/// Chat widget routes
pub fn routes(service: Arc<ChatService>) -> Router {
    Router::new()
        .route("/api/chat/messages", post(handlers::post_visitor_message))
        .route(
            "/api/chat/sessions/{session_id}/messages",
            get(handlers::get_session_messages),
        )
        .with_state(service)
}

/// Back-office chat routes
pub fn admin_routes(service: Arc<ChatService>) -> Router {
    Router::new()
        .route(
            "/api/admin/chat/conversations",
            get(handlers::list_conversations),
        )
        .route(
            "/api/admin/chat/conversations/{id}/messages",
            get(handlers::get_conversation_messages).post(handlers::post_admin_message),
        )
        .route(
            "/api/admin/chat/conversations/{id}/suggestion",
            post(handlers::suggest_reply),
        )
        .route(
            "/api/admin/chat/conversations/{id}/status",
            put(handlers::update_conversation_status),
        )
        .route("/api/admin/chat/status", get(handlers::get_chat_status))
        .route(
            "/api/admin/chat/auto-reply",
            get(handlers::get_auto_reply).put(handlers::set_auto_reply),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::settings::services::SettingsService;
    use crate::modules::llm::testing::ScriptedModel;
    use crate::modules::llm::ChatCompletion;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn service(llm: Option<Arc<dyn ChatCompletion>>) -> Arc<ChatService> {
        let pool = lazy_pool();
        Arc::new(ChatService::new(
            pool.clone(),
            Arc::new(SettingsService::new(pool)),
            llm,
            "Blog".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_visitor_message_requires_session() {
        let server = TestServer::new(routes(service(None))).unwrap();
        let response = server
            .post("/api/chat/messages")
            .json(&json!({"session_id": "", "message": "Bonjour"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errors"].is_array());
    }

    #[tokio::test]
    async fn test_visitor_message_rejects_blank_or_long_text() {
        let server = TestServer::new(routes(service(None))).unwrap();
        server
            .post("/api/chat/messages")
            .json(&json!({"session_id": "abc", "message": "   "}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .post("/api/chat/messages")
            .json(&json!({"session_id": "abc", "message": "x".repeat(2001)}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_visitor_message_rejects_bad_email() {
        let server = TestServer::new(routes(service(None))).unwrap();
        server
            .post("/api/chat/messages")
            .json(&json!({
                "session_id": "abc",
                "message": "Bonjour",
                "visitor_email": "nope"
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_messages_rejects_bad_timestamp() {
        let server = TestServer::new(routes(service(None))).unwrap();
        server
            .get("/api/chat/sessions/abc/messages")
            .add_query_param("after", "yesterday")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let server = TestServer::new(admin_routes(service(None))).unwrap();
        server
            .get("/api/admin/chat/conversations")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .put("/api/admin/chat/auto-reply")
            .json(&json!({"enabled": false}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_suggestion_without_model_is_bad_gateway() {
        let server = TestServer::new(with_admin_auth(admin_routes(service(None)))).unwrap();
        let response = server
            .post(&format!(
                "/api/admin/chat/conversations/{}/suggestion",
                Uuid::new_v4()
            ))
            .await;
        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_admin_message_rejects_blank_text() {
        let model: Arc<dyn ChatCompletion> = Arc::new(ScriptedModel::replying("Bonjour !"));
        let server =
            TestServer::new(with_admin_auth(admin_routes(service(Some(model))))).unwrap();
        server
            .post(&format!(
                "/api/admin/chat/conversations/{}/messages",
                Uuid::new_v4()
            ))
            .json(&json!({"message": "  "}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_update_rejects_unknown_status() {
        let server = TestServer::new(with_admin_auth(admin_routes(service(None)))).unwrap();
        server
            .put(&format!(
                "/api/admin/chat/conversations/{}/status",
                Uuid::new_v4()
            ))
            .json(&json!({"status": "archived"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
