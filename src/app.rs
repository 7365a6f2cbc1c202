/*
 * Responsibility
 * - Config → services → AppState → Router
 * - Layer order, outermost first: CORS, HTTP infrastructure, auth pipeline
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, PasswordHashProfile};
use crate::middleware;
use crate::middleware::auth::AccessPolicy;
use crate::services::auth::credentials::{
    CredentialStore, InMemoryCredentialStore, PgCredentialStore,
};
use crate::services::auth::password::{Argon2Scheme, DelegatingScheme, PasswordScheme};
use crate::services::auth::{LoginService, TokenProvider};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,agenda_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let tokens = Arc::new(TokenProvider::new(
        config.token_secret.as_bytes(),
        config.token_ttl_seconds,
    ));

    let policy = Arc::new(AccessPolicy::standard().context("invalid access rule table")?);
    tracing::info!(rules = policy.rules().len(), "access policy loaded");

    let credentials: Arc<dyn CredentialStore> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            Arc::new(PgCredentialStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; accounts are kept in memory only");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let argon2 = match config.password_hash_profile {
        PasswordHashProfile::Default => Argon2Scheme::default(),
        PasswordHashProfile::Fast => Argon2Scheme::fast()?,
    };
    let passwords: Arc<dyn PasswordScheme> = Arc::new(DelegatingScheme::new(argon2));

    let login = Arc::new(LoginService::new(credentials, passwords)?);

    Ok(AppState::new(tokens, policy, login))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::access::apply(api::routes(), state.clone()).with_state(state);
    let router = middleware::http::apply(router, &config.http);
    middleware::cors::apply(router, config)
}
