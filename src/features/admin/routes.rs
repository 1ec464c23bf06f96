use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::admin::handlers;
use crate::features::admin::services::StatsService;

/// Back-office overview routes
pub fn routes(service: Arc<StatsService>) -> Router {
    Router::new()
        .route("/api/admin/stats", get(handlers::get_stats))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::lazy_pool;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_stats_require_admin() {
        let server = TestServer::new(routes(Arc::new(StatsService::new(lazy_pool())))).unwrap();
        server
            .get("/api/admin/stats")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
