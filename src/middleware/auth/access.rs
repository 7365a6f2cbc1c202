//! Bearer token verification and route policy, once per request.
//!
//! Two stages, always in this order:
//! 1. `authenticate` reads `Authorization`, verifies a bearer token and resolves
//!    the `SecurityContext` (anonymous when no bearer credential was sent).
//! 2. `authorize` evaluates the access table against that context.
//!
//! Either stage may end the request with an `AuthFailure`. Otherwise the
//! context goes into the request extensions, where handlers pick it up through
//! the extractors in `api::extractors`.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::middleware::auth::{
    context::SecurityContext,
    failure::AuthFailure,
    policy::{AccessPolicy, Decision},
};
use crate::services::auth::TokenProvider;
use crate::state::AppState;

/// Put the whole router behind the auth pipeline.
///
/// Apply after routes and fallback are registered so unknown paths are
/// covered by the default requirement too.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthFailure> {
    let method = req.method().clone();
    let path = original_uri.path();

    let ctx = authenticate(req.headers(), &state.tokens, Utc::now()).inspect_err(|failure| {
        warn!(%failure, %method, path, "authentication failed");
    })?;

    authorize(&state.policy, &method, path, &ctx).inspect_err(|failure| {
        warn!(
            %failure,
            %method,
            path,
            user = ctx.principal().map(|p| p.username.as_str()),
            "access denied"
        );
    })?;

    debug!(
        %method,
        path,
        user = ctx.principal().map(|p| p.username.as_str()),
        "access granted"
    );

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// The bearer token, if the request carries one.
///
/// - no `Authorization` header, or a non-bearer scheme: `Ok(None)`
/// - repeated header, non-ASCII value, or `Bearer` without a token: `MalformedToken`
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthFailure> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let Some(value) = values.next() else {
        return Ok(None);
    };
    if values.next().is_some() {
        return Err(AuthFailure::MalformedToken);
    }

    let value = value.to_str().map_err(|_| AuthFailure::MalformedToken)?.trim();
    let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Ok(None);
    }

    let token = rest.trim();
    if token.is_empty() {
        return Err(AuthFailure::MalformedToken);
    }
    Ok(Some(token))
}

pub fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenProvider,
    now: DateTime<Utc>,
) -> Result<SecurityContext, AuthFailure> {
    match bearer_token(headers)? {
        None => Ok(SecurityContext::Anonymous),
        Some(token) => {
            let principal = tokens.verify_at(token, now)?;
            Ok(SecurityContext::Authenticated(principal))
        }
    }
}

/// A denied anonymous request is an authentication failure, not an
/// authorization one.
pub fn authorize(
    policy: &AccessPolicy,
    method: &Method,
    path: &str,
    ctx: &SecurityContext,
) -> Result<(), AuthFailure> {
    match (policy.authorize(method, path, ctx), ctx) {
        (Decision::Allow, _) => Ok(()),
        (Decision::Deny, SecurityContext::Anonymous) => Err(AuthFailure::MissingCredential),
        (Decision::Deny, SecurityContext::Authenticated(_)) => Err(AuthFailure::InsufficientRole),
    }
}
