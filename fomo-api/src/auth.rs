//! Admin credential checking and session tokens
//!
//! The admin panel logs in with a single configured password and receives
//! an HS256-signed JWT carrying an expiry. Every protected request presents
//! the token as `Authorization: Bearer <token>`; verification checks the
//! signature and expiry, so a token cannot be forged from the password or
//! reused after it lapses.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Subject written into every admin token
pub const ADMIN_SUBJECT: &str = "admin";

/// Authentication failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Failed to issue token: {0}")]
    Signing(String),
}

/// Payload stored in an admin token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Password check plus token issue/verify
pub struct AdminAuth {
    password_digest: [u8; 32],
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AdminAuth {
    pub fn new(password: &str, secret: &[u8], token_ttl: Duration) -> Self {
        Self {
            password_digest: Sha256::digest(password.as_bytes()).into(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
        }
    }

    /// Signing secret generated for this process only; tokens die with the process
    pub fn with_random_secret(password: &str, token_ttl: Duration) -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(password, &secret, token_ttl)
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Compare digests so the comparison does not depend on the candidate's length
    pub fn check_password(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        candidate
            .iter()
            .zip(self.password_digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Check the password and issue a token
    pub fn login(&self, password: &str) -> Result<IssuedToken, AuthError> {
        if !self.check_password(password) {
            return Err(AuthError::InvalidPassword);
        }
        self.issue(Utc::now())
    }

    /// Issue a token as of `now`
    pub fn issue(&self, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let ttl = chrono::Duration::from_std(self.token_ttl)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        let expires_at = now + ttl;

        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, expiry and subject
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<AdminClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidToken("bad signature".to_string()),
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.sub != ADMIN_SUBJECT {
            return Err(AuthError::InvalidToken("unexpected subject".to_string()));
        }

        Ok(data.claims)
    }
}

impl AdminClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}
