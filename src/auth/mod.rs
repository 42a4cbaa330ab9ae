use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::User;

/// Claims carried by the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("password hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Signing material and cookie policy for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
    secure_cookies: bool,
}

impl SessionKeys {
    pub fn new(security: &SecurityConfig) -> Self {
        let secret = security.session_secret.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            expiry_hours: security.session_expiry_hours,
            secure_cookies: security.secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn issue(&self, user: &User) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| SessionError::TokenGeneration(e.to_string()))
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}

fn hash_password_blocking(password: &str) -> Result<String, SessionError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| SessionError::PasswordHash(e.to_string()))
}

fn verify_password_blocking(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Verified against when the username does not exist, so both failure paths
/// cost one argon2 verification.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password_blocking("not-a-real-password").unwrap_or_default());

pub async fn hash_password(password: String) -> Result<String, SessionError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password)).await?
}

/// `hash` of `None` means the account does not exist; the result is then
/// always `false` after doing the same amount of work.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool, SessionError> {
    let verified = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password_blocking(&password, &hash),
        None => {
            verify_password_blocking(&password, &DUMMY_HASH);
            false
        }
    })
    .await?;
    Ok(verified)
}
