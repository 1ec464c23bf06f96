use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::Duration;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::Claims;
use crate::shared::constants::ROLE_ADMIN;

/// Signs HS256 access tokens for the back-office
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue an admin token for `username`
    ///
    /// Returns (access_token, expires_in_seconds)
    pub fn issue(&self, username: &str) -> Result<(String, i64)> {
        let now = Utc::now().timestamp();
        let expires_in = self.ttl.as_secs() as i64;

        let claims = Claims {
            sub: username.to_string(),
            role: ROLE_ADMIN.to_string(),
            iat: now,
            exp: now + expires_in,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok((token, expires_in))
    }
}
