use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .with_state(service)
}

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(handlers::get_me))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AdminAuthConfig;
    use crate::core::middleware::auth_middleware;
    use crate::features::auth::JwtValidator;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn config() -> AdminAuthConfig {
        AdminAuthConfig {
            username: "admin".to_string(),
            password: "s3cret-pass".to_string(),
            jwt_secret: "k".repeat(48),
            token_ttl: Duration::from_secs(600),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn server() -> TestServer {
        let config = config();
        let service = Arc::new(AuthService::new(&config).unwrap());
        let validator = Arc::new(JwtValidator::new(&config.jwt_secret, config.jwt_leeway));

        let app = public_routes(service.clone()).merge(protected_routes(service).layer(
            axum::middleware::from_fn_with_state(validator, auth_middleware),
        ));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let server = server();

        let login = server
            .post("/api/auth/login")
            .json(&json!({"username": "admin", "password": "s3cret-pass"}))
            .await;
        login.assert_status_ok();
        let body: Value = login.json();
        let token = body["data"]["access_token"].as_str().unwrap().to_string();

        let me = server
            .get("/api/auth/me")
            .authorization_bearer(token)
            .await;
        me.assert_status_ok();
        let body: Value = me.json();
        assert_eq!(body["data"]["username"], "admin");
        assert_eq!(body["data"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let response = server()
            .post("/api/auth/login")
            .json(&json!({"username": "admin", "password": "nope"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_login_empty_fields_rejected() {
        let response = server()
            .post("/api/auth/login")
            .json(&json!({"username": "", "password": ""}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let server = server();
        server
            .get("/api/auth/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/auth/me")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
