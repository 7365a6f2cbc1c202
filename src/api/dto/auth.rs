/*
 * Responsibility
 * - request/response DTOs for /authenticate, /signup and /me
 * - validate() does shape checks only; credential checks live in LoginService
 */
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::auth::Principal;
use crate::services::auth::token::IssuedToken;

const MAX_USERNAME_LEN: usize = 64;
const MAX_PASSWORD_LEN: usize = 256;

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

impl AuthenticateRequest {
    /// No stored account can match a password longer than signup accepts, and
    /// hashing one would cost the full body limit.
    pub fn password_within_limit(&self) -> bool {
        self.password.len() <= MAX_PASSWORD_LEN
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_in: issued.expires_in_seconds(),
            expires_at: issued.expires_at,
            token: issued.token,
            token_type: "Bearer",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err("username is required");
        }
        if username.len() > MAX_USERNAME_LEN {
            return Err("username must be <= 64 chars");
        }
        if username != self.username {
            return Err("username must not have surrounding whitespace");
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("email is invalid");
        }
        if self.password.trim().is_empty() {
            return Err("password is required");
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err("password must be <= 256 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub id: i64,
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            username: p.username,
            roles: p.roles,
        }
    }
}
