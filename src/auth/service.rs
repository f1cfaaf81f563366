//! Credential service: Argon2 password hashing and JWT tokens.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Authentication errors. These only surface on programmer error or
/// library-level failures; bad credentials never produce an error.
#[derive(Error, Diagnostic, Debug)]
pub enum AuthError {
    #[error("Password hashing error: {message}")]
    #[diagnostic(code(taskdeck::auth::hashing))]
    Hashing { message: String },

    #[error("Token encoding error: {message}")]
    #[diagnostic(code(taskdeck::auth::token))]
    Token { message: String },
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing configuration for the credential service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub jwt_expiration_hours: i64,
}

impl AuthConfig {
    /// Load from `JWT_SECRET`, `JWT_ALGORITHM`, and `JWT_EXPIRATION_HOURS`,
    /// with development defaults.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "change-this-jwt-signing-secret-in-production".to_string());
        let jwt_algorithm = std::env::var("JWT_ALGORITHM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Algorithm::HS256);
        let jwt_expiration_hours = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        Self {
            jwt_secret,
            jwt_algorithm,
            jwt_expiration_hours,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-jwt-signing-secret-in-production".to_string(),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_hours: 24,
        }
    }
}

/// Credential service.
///
/// Carries only immutable signing configuration; constructed once and
/// injected into the application state.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
    algorithm: Algorithm,
    expiration_hours: i64,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret,
            algorithm: config.jwt_algorithm,
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Hash a password with Argon2 and a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing {
                message: e.to_string(),
            })?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Returns false on any mismatch or malformed hash; never errors.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Issue a signed access token for the given user.
    pub fn create_access_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiration_hours)).timestamp(),
        };

        encode(
            &Header::new(self.algorithm),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Token {
            message: e.to_string(),
        })
    }

    /// Verify signature and expiry, returning the claims when valid.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(self.algorithm),
        )
        .map(|data| data.claims)
        .ok()
    }
}

/// Check a password against the registration rules, in fixed order.
///
/// Returns the first failing rule's message.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    Ok(())
}
