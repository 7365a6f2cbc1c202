/*
 * Responsibility
 * - POST /signup: register an account with the default USER role
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::dto::auth::{PrincipalResponse, SignupRequest},
    error::AppError,
    services::auth::login::Signup,
    state::AppState,
};

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<PrincipalResponse>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_SIGNUP", m))?;

    let principal = state
        .login
        .register(Signup {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(principal.into())))
}
