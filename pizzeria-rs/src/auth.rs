//! Credential handling and signed session tokens.
//!
//! Passwords are hashed with Argon2 and a per-user random salt; the store only
//! ever sees the PHC-format hash string. Sessions are stateless HS256 JWTs
//! carrying `{sub, name, iat, exp}`, signed with a symmetric secret from
//! configuration and handed to the client as an HTTP-only cookie.
//!
//! Verification fails closed: a malformed, expired, or wrongly signed token is
//! always the single `TokenInvalid` outcome.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::store::{Database, NewUser, StoreError, User};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("no account for that email")]
    UnknownEmail,
    #[error("password does not match")]
    InvalidPassword,
    #[error("session token rejected")]
    TokenInvalid,
    #[error("password hashing failed")]
    Hashing,
    #[error(transparent)]
    Store(StoreError),
}

/// JWT claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity decoded from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
}

/// Symmetric signing material plus token lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: std::time::Duration) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(24)),
        }
    }

    /// Mint a signed token for the given user, expiring after the configured
    /// lifetime.
    pub fn issue(&self, user_id: &str, user_name: &str) -> Result<String, AuthError> {
        let issued_at = Utc::now();
        let claims = Claims {
            sub: String::from(user_id),
            name: String::from(user_name),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            error!(error = %err, "failed to sign session token");
            AuthError::TokenInvalid
        })
    }

    /// Check signature and expiry (zero leeway) and return the embedded
    /// identity. Every failure mode collapses to `TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<SessionUser, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| SessionUser {
                id: data.claims.sub,
                name: data.claims.name,
            })
            .map_err(|_| AuthError::TokenInvalid)
    }
}

/// Hash a password on the blocking pool; Argon2 is CPU-bound and would stall
/// the async workers otherwise.
pub async fn hash_password(plaintext: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password_sync(&plaintext))
        .await
        .map_err(|err| {
            error!(error = %err, "password hashing task failed");
            AuthError::Hashing
        })?
}

fn hash_password_sync(plaintext: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!(error = %err, "argon2 hashing failed");
            AuthError::Hashing
        })
}

fn verify_password_sync(plaintext: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|err| {
        error!(error = %err, "stored password hash is not a valid PHC string");
        AuthError::InvalidPassword
    })?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(AuthError::InvalidPassword),
        Err(err) => {
            error!(error = %err, "password verification errored");
            Err(AuthError::InvalidPassword)
        }
    }
}

/// Hash the password and create the user record. One store write.
pub async fn register_credentials(
    db: &Database,
    name: &str,
    email: &str,
    plaintext: &str,
) -> Result<User, AuthError> {
    let password_hash = hash_password(String::from(plaintext)).await?;

    db.insert_user(NewUser {
        name: String::from(name),
        email: String::from(email),
        password_hash,
    })
    .await
    .map_err(|err| match err {
        StoreError::DuplicateEmail(_) => AuthError::DuplicateEmail,
        other => AuthError::Store(other),
    })
}

/// Look up by email and verify the password against the stored hash.
pub async fn verify_credentials(
    db: &Database,
    email: &str,
    plaintext: &str,
) -> Result<User, AuthError> {
    let user = db
        .find_user_by_email(email)
        .await
        .ok_or(AuthError::UnknownEmail)?;

    let stored_hash = user.password_hash.clone();
    let plaintext = String::from(plaintext);
    tokio::task::spawn_blocking(move || verify_password_sync(&plaintext, &stored_hash))
        .await
        .map_err(|err| {
            error!(error = %err, "password verification task failed");
            AuthError::Hashing
        })??;

    Ok(user)
}
