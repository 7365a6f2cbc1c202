use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::middleware::auth::{AuthFailure, SecurityContext};
use crate::services::auth::Principal;
use crate::state::AppState;

/// Whatever the auth middleware resolved, anonymous included.
///
/// Missing context means the middleware is not installed on this route; that
/// is rejected rather than treated as anonymous.
pub struct Security(pub SecurityContext);

impl FromRequestParts<AppState> for Security {
    type Rejection = AuthFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(Security)
            .ok_or(AuthFailure::MissingCredential)
    }
}

/// The authenticated principal; anonymous requests are rejected with 401.
pub struct CurrentPrincipal(pub Principal);

impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = AuthFailure;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Security(ctx) = Security::from_request_parts(parts, state).await?;
        ctx.into_principal()
            .map(CurrentPrincipal)
            .ok_or(AuthFailure::MissingCredential)
    }
}
