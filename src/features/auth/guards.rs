//! Role-based authorization guards for the back-office.
//!
//! The guard extracts the authenticated user placed in request extensions by
//! `auth_middleware` and verifies the admin role.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedAdmin;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for checking if user is an administrator.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(admin): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !admin.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(admin.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    fn parts_with(admin: Option<AuthenticatedAdmin>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(admin) = admin {
            parts.extensions.insert(admin);
        }
        parts
    }

    fn user(role: &str) -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            username: "alice".to_string(),
            role: role.to_string(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let mut parts = parts_with(None);
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let mut parts = parts_with(Some(user("editor")));
        let result = RequireAdmin::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let mut parts = parts_with(Some(user("admin")));
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(admin.username, "alice");
    }
}
