use std::sync::Arc;

use axum::{routing::get, Router};

use super::handlers::list_settings;
use super::services::SettingsService;

/// Create admin routes for runtime settings
pub fn admin_routes(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/api/admin/settings", get(list_settings))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lazy_pool, with_admin_auth};
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn service() -> Arc<SettingsService> {
        Arc::new(SettingsService::new(lazy_pool()))
    }

    #[tokio::test]
    async fn test_settings_require_admin() {
        let server = TestServer::new(admin_routes(service())).unwrap();
        server
            .get("/api/admin/settings")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_database_failure_is_internal_error() {
        let server = TestServer::new(with_admin_auth(admin_routes(service()))).unwrap();
        server
            .get("/api/admin/settings")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
