use std::collections::BTreeSet;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::principal::Principal;

/// Shortest HMAC secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Signed payload. `roles` is a BTreeSet so the serialized order never
/// depends on insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    uid: i64,
    roles: BTreeSet<String>,
    iat: i64,
    exp: i64,
    jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn expires_in_seconds(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// HS256 token issuer and verifier.
///
/// Holds only the process-wide secret and the TTL, both fixed at startup, so a
/// single instance is shared by every request without locking.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: ChronoDuration,
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenProvider")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenProvider {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: ChronoDuration::seconds(ttl_seconds as i64),
        }
    }

    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, AppError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = now + self.ttl;

        let claims = TokenClaims {
            sub: principal.username.clone(),
            uid: principal.id,
            roles: principal.roles.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let token = jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign token");
            AppError::Internal
        })?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Structure, then signature, then expiry.
    ///
    /// The HMAC comparison happens inside jsonwebtoken's aws-lc backend, which
    /// compares tags in constant time. Claims are only deserialized once the
    /// signature over the raw header and payload segments has been accepted.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() || claims.exp < claims.iat {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(Principal {
            id: claims.uid,
            username: claims.sub,
            roles: claims.roles,
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
