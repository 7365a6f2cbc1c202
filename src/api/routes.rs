/*
 * Responsibility
 * - URL structure of the API
 * - No auth wiring here: every route, the fallback included, sits behind
 *   middleware::auth::access, and the access table decides who gets through
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    api::handlers::{authenticate::authenticate, health::health, me::me, resources, signup::signup},
    error::AppError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/authenticate", post(authenticate))
        .route("/signup", post(signup))
        .route("/me", get(me))
        .route("/{resource}", get(resources::list).post(resources::create))
        .route(
            "/{resource}/{id}",
            get(resources::get)
                .put(resources::update)
                .delete(resources::delete),
        )
        .fallback(fallback)
}

async fn fallback() -> AppError {
    AppError::not_found("route")
}
