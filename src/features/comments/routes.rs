use std::sync::Arc;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Public comment routes
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .with_state(service)
}

/// Moderation routes
pub fn admin_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/admin/comments", get(handlers::admin_list_comments))
        .route(
            "/api/admin/comments/{id}/status",
            put(handlers::update_comment_status),
        )
        .route("/api/admin/comments/{id}", delete(handlers::delete_comment))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn service() -> Arc<CommentService> {
        Arc::new(CommentService::new(lazy_pool(), true))
    }

    #[tokio::test]
    async fn test_list_requires_article_slug() {
        let server = TestServer::new(routes(service())).unwrap();
        let response = server.get("/api/comments").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "article_slug is required");

        server
            .get("/api/comments")
            .add_query_param("article_slug", "  ")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let server = TestServer::new(routes(service())).unwrap();
        server
            .post("/api/comments")
            .json(&json!({"article_slug": "mon-article"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_content() {
        let server = TestServer::new(routes(service())).unwrap();
        let response = server
            .post("/api/comments")
            .json(&json!({
                "article_slug": "mon-article",
                "author_name": "Awa",
                "content": "   "
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["errors"].is_array());
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let server = TestServer::new(admin_routes(service())).unwrap();
        server
            .get("/api/admin/comments")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_status_update_rejects_unknown_status() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();
        server
            .put(&format!("/api/admin/comments/{}/status", uuid::Uuid::new_v4()))
            .json(&json!({"status": "hidden"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
