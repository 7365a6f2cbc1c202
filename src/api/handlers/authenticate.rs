/*
 * Responsibility
 * - POST /authenticate: check credentials, issue a token
 * - token is returned in the body and as `Authorization: Bearer <token>`
 * - any credential problem answers with the same 401 as the auth pipeline
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};

use crate::{
    api::dto::auth::{AuthenticateRequest, TokenResponse},
    error::AppError,
    state::AppState,
};

pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<AuthenticateRequest>,
) -> Result<Response, AppError> {
    if !req.password_within_limit() {
        tracing::warn!(username = %req.username, "login rejected: password too long");
        return Err(AppError::Unauthenticated);
    }

    let principal = state
        .login
        .authenticate(&req.username, &req.password)
        .await?;
    let issued = state.tokens.issue(&principal)?;

    let bearer = HeaderValue::from_str(&format!("Bearer {}", issued.token))
        .map_err(|_| AppError::Internal)?;

    Ok((
        [(header::AUTHORIZATION, bearer)],
        Json(TokenResponse::from(issued)),
    )
        .into_response())
}
