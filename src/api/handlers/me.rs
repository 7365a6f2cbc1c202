use axum::Json;

use crate::api::{dto::auth::PrincipalResponse, extractors::CurrentPrincipal};

/// GET /me: the principal the bearer token resolved to.
pub async fn me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<PrincipalResponse> {
    Json(principal.into())
}
