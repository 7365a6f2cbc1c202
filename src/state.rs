/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Everything inside is immutable after startup and cheap to Clone (Arc)
 */
use std::sync::Arc;

use crate::middleware::auth::AccessPolicy;
use crate::services::auth::{LoginService, TokenProvider};

#[derive(Clone, Debug)]
pub struct AppState {
    pub tokens: Arc<TokenProvider>,
    pub policy: Arc<AccessPolicy>,
    pub login: Arc<LoginService>,
}

impl AppState {
    pub fn new(tokens: Arc<TokenProvider>, policy: Arc<AccessPolicy>, login: Arc<LoginService>) -> Self {
        Self {
            tokens,
            policy,
            login,
        }
    }
}
