use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::articles::handlers;
use crate::features::articles::services::{ArticleService, FeedService};

/// Public blog routes: article listing, article pages and the RSS feed
pub fn routes(service: Arc<ArticleService>, feed: Arc<FeedService>) -> Router {
    let articles = Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/{slug}", get(handlers::get_article))
        .with_state(service);

    let rss = Router::new()
        .route("/rss.xml", get(handlers::rss_feed))
        .with_state(feed);

    articles.merge(rss)
}

/// Back-office article routes
pub fn admin_routes(service: Arc<ArticleService>) -> Router {
    Router::new()
        .route(
            "/api/admin/articles",
            get(handlers::admin_list_articles).post(handlers::create_article),
        )
        .route(
            "/api/admin/articles/{id}",
            get(handlers::admin_get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn service() -> Arc<ArticleService> {
        Arc::new(ArticleService::new(lazy_pool()))
    }

    fn admin_server() -> TestServer {
        TestServer::new(with_admin_auth(admin_routes(service()))).unwrap()
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let server = TestServer::new(admin_routes(service())).unwrap();
        server
            .get("/api/admin/articles")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/admin/articles")
            .json(&json!({"title": "t", "content": "c"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_content() {
        let response = admin_server()
            .post("/api/admin/articles")
            .json(&json!({"title": "", "content": ""}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["errors"].is_array());
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_slug() {
        admin_server()
            .post("/api/admin/articles")
            .json(&json!({"title": "Titre", "content": "Texte", "slug": "Not A Slug"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_status() {
        admin_server()
            .post("/api/admin/articles")
            .json(&json!({"title": "Titre", "content": "Texte", "status": "scheduled"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_title() {
        admin_server()
            .put(&format!("/api/admin/articles/{}", uuid::Uuid::new_v4()))
            .json(&json!({"title": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_rejects_bad_id() {
        admin_server()
            .delete("/api/admin/articles/not-a-uuid")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
