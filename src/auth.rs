use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::Principal,
    repository::AccountRepositoryState,
};

// --- Password Hashing ---

/// PasswordHasher
///
/// One-way hashing of plain-text passwords. Output is not required to be deterministic,
/// so comparison always goes through `verify`.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AppError>;
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

pub type PasswordHasherState = Arc<dyn PasswordHasher>;

/// Argon2id with the crate's default parameters and a random salt per hash.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher;

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal("failed to hash password".to_string())
            })
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is unparsable: {:?}", e);
                false
            }
        }
    }
}

// --- Tokens ---

/// Claims
///
/// The JWT payload issued at login and validated on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id, as a decimal string.
    pub sub: String,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at (seconds since the epoch).
    pub iat: usize,
}

/// issue_token
///
/// Signs an HS256 token for `account_id` that expires `config.jwt_ttl_seconds` from now.
pub fn issue_token(account_id: i64, config: &AppConfig) -> Result<String, AppError> {
    let now = usize::try_from(Utc::now().timestamp())
        .map_err(|_| AppError::Internal("system clock is before the epoch".to_string()))?;
    let ttl = usize::try_from(config.jwt_ttl_seconds)
        .map_err(|_| AppError::Internal("token lifetime overflows".to_string()))?;

    let claims = Claims {
        sub: account_id.to_string(),
        iat: now,
        exp: now.saturating_add(ttl),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign token: {:?}", e);
        AppError::Internal("failed to sign token".to_string())
    })
}

/// Validates signature and expiry, returning the account id named by `sub`.
pub fn verify_token(token: &str, secret: &str) -> Result<i64, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {:?}", e.kind());
            AppError::Unauthorized
        })?;

    data.claims.sub.parse::<i64>().map_err(|_| AppError::Unauthorized)
}

// --- Principal Extraction ---

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers pass the inner
/// [`Principal`] explicitly into the service layer.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

/// AuthUser Extractor Implementation
///
/// 1. Local bypass: in `Env::Local` an `x-user-id` header naming an existing account is accepted.
/// 2. Bearer token: `Authorization: Bearer <jwt>` is decoded and validated.
/// 3. DB lookup: the account is re-read so deleted accounts and changed roles take effect
///    immediately.
///
/// Rejection: `AppError::Unauthorized` (401) on any credential failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AccountRepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let accounts = AccountRepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            let bypass_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| raw.parse::<i64>().ok());

            if let Some(id) = bypass_id {
                if let Some(account) = accounts.find_by_id(id).await? {
                    return Ok(AuthUser(account.principal()));
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let account_id = verify_token(token, &config.jwt_secret)?;

        let account = accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(account.principal()))
    }
}
