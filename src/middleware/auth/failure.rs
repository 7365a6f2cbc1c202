//! Authentication and authorization failures, and the two responses they map to.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::TokenError;

pub const UNAUTHENTICATED_MESSAGE: &str = "Bad credentials.";
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing credential")]
    MissingCredential,
    #[error("malformed token")]
    MalformedToken,
    #[error("bad token signature")]
    BadSignature,
    #[error("expired token")]
    ExpiredToken,
    #[error("insufficient role")]
    InsufficientRole,
}

impl AuthFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthFailure::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<TokenError> for AuthFailure {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed => AuthFailure::MalformedToken,
            TokenError::BadSignature => AuthFailure::BadSignature,
            TokenError::Expired => AuthFailure::ExpiredToken,
        }
    }
}

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        match self {
            AuthFailure::InsufficientRole => access_denied(),
            _ => unauthenticated(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageBody {
    message: &'static str,
}

/// 401 for a missing, unreadable, forged or expired credential.
pub fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(MessageBody {
            message: UNAUTHENTICATED_MESSAGE,
        }),
    )
        .into_response()
}

/// 403 for an authenticated principal without the required role.
pub fn access_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(MessageBody {
            message: ACCESS_DENIED_MESSAGE,
        }),
    )
        .into_response()
}
