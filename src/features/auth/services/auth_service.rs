use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::core::config::AdminAuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, MeResponseDto};
use crate::features::auth::model::AuthenticatedAdmin;
use crate::features::auth::services::TokenIssuer;

type HmacSha256 = Hmac<Sha256>;

/// Service for back-office sign-in
pub struct AuthService {
    username: String,
    password_mac: Vec<u8>,
    mac_key: Vec<u8>,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(config: &AdminAuthConfig) -> Result<Self> {
        let mac_key = config.jwt_secret.as_bytes().to_vec();
        let password_mac = Self::mac(&mac_key, &config.password)?;

        Ok(Self {
            username: config.username.clone(),
            password_mac,
            mac_key,
            issuer: TokenIssuer::new(&config.jwt_secret, config.token_ttl),
        })
    }

    fn mac(key: &[u8], value: &str) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(value.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Compare the supplied password against the configured one in constant time
    fn password_matches(&self, candidate: &str) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
        mac.update(candidate.as_bytes());
        Ok(mac.verify_slice(&self.password_mac).is_ok())
    }

    pub fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        // Evaluate both checks so a wrong username costs the same as a wrong password
        let password_ok = self.password_matches(&dto.password)?;
        let username_ok = dto.username == self.username;

        if !(username_ok && password_ok) {
            tracing::warn!(username = %dto.username, "Rejected admin login");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let (access_token, expires_in) = self.issuer.issue(&self.username)?;
        tracing::info!(username = %self.username, "Admin signed in");

        Ok(AuthResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    pub fn current_admin(&self, admin: AuthenticatedAdmin) -> MeResponseDto {
        MeResponseDto {
            username: admin.username,
            role: admin.role,
            expires_at: admin.expires_at,
        }
    }
}
