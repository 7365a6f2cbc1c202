//! Shared fixtures for the API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agenda_api::{
    app::build_router,
    config::{AppEnv, Config, HttpSettings, PasswordHashProfile, TokenSecret},
    middleware::auth::AccessPolicy,
    services::auth::{
        LoginService, Principal, TokenProvider,
        credentials::{CredentialStore, InMemoryCredentialStore, NewCredential},
        password::{Argon2Scheme, DelegatingScheme, PasswordScheme},
    },
    state::AppState,
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, Response, header},
};
use serde_json::Value;

pub const SECRET: &str = "integration-test-secret-with-32-bytes!";
pub const TTL_SECONDS: u64 = 600;

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        database_url: None,
        token_secret: TokenSecret::new(SECRET).unwrap(),
        token_ttl_seconds: TTL_SECONDS,
        password_hash_profile: PasswordHashProfile::Fast,
        http: HttpSettings {
            request_timeout: Duration::from_secs(5),
            body_limit_bytes: 64 * 1024,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub tokens: Arc<TokenProvider>,
    pub store: Arc<InMemoryCredentialStore>,
    pub passwords: Arc<DelegatingScheme>,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let tokens = Arc::new(TokenProvider::new(SECRET.as_bytes(), TTL_SECONDS));
        let store = Arc::new(InMemoryCredentialStore::new());
        let passwords = Arc::new(DelegatingScheme::new(Argon2Scheme::fast().unwrap()));
        let login = Arc::new(LoginService::new(store.clone(), passwords.clone()).unwrap());
        let policy = Arc::new(AccessPolicy::standard().unwrap());

        let state = AppState::new(tokens.clone(), policy, login);
        let router = build_router(state, &config);

        Self {
            router,
            tokens,
            store,
            passwords,
        }
    }

    /// Store an account directly, bypassing /signup, so arbitrary roles can be set.
    pub async fn add_user(&self, username: &str, password: &str, role: &str) -> Principal {
        let hash = self.passwords.hash(password).unwrap();
        self.add_user_with_hash(username, &hash, role).await
    }

    /// Store an account whose password hash was produced elsewhere.
    pub async fn add_user_with_hash(&self, username: &str, hash: &str, role: &str) -> Principal {
        self.store
            .register(NewCredential {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: hash.to_string(),
                role: role.to_string(),
                enabled: true,
            })
            .await
            .unwrap()
            .principal()
    }

    pub fn token_for(&self, principal: &Principal) -> String {
        self.tokens.issue(principal).unwrap().token
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;

        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
