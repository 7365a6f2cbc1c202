/*
 * Responsibility
 * - Read settings from the environment (.env honoured) once at startup
 * - Validate them; anything missing or invalid stops the process
 * - Nothing here is mutated after startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::token::MIN_SECRET_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordHashProfile {
    /// argon2 library defaults
    Default,
    /// minimum argon2 cost, never for production
    Fast,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl HttpSettings {
    /// Zero for either knob would fail every request, so it is rejected.
    pub fn new(request_timeout_seconds: u64, body_limit_bytes: usize) -> Result<Self, ConfigError> {
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }
        if body_limit_bytes == 0 {
            return Err(ConfigError::Invalid("REQUEST_BODY_LIMIT_BYTES"));
        }
        Ok(Self {
            request_timeout: Duration::from_secs(request_timeout_seconds),
            body_limit_bytes,
        })
    }
}

/// Token signing secret. Kept out of `Debug` output.
#[derive(Clone)]
pub struct TokenSecret(Vec<u8>);

impl TokenSecret {
    pub fn new(raw: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = raw.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid("TOKEN_SECRET"));
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(..)")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub database_url: Option<String>,

    pub token_secret: TokenSecret,
    pub token_ttl_seconds: u64,
    pub password_hash_profile: PasswordHashProfile,

    pub http: HttpSettings,
}

// Upper bound keeps `ttl as i64` and `now + ttl` far from overflow.
const MAX_TOKEN_TTL_SECONDS: u64 = 60 * 60 * 24 * 365;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let token_secret = TokenSecret::new(
            std::env::var("TOKEN_SECRET").map_err(|_| ConfigError::Missing("TOKEN_SECRET"))?,
        )?;

        let token_ttl_seconds: u64 = parse_or("TOKEN_TTL_SECONDS", 600)?; // 10 min
        if token_ttl_seconds == 0 || token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(ConfigError::Invalid("TOKEN_TTL_SECONDS"));
        }

        let password_hash_profile = match std::env::var("PASSWORD_HASH_PROFILE")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "" | "default" => PasswordHashProfile::Default,
            "fast" => PasswordHashProfile::Fast,
            _ => return Err(ConfigError::Invalid("PASSWORD_HASH_PROFILE")),
        };
        if app_env.is_production() && password_hash_profile == PasswordHashProfile::Fast {
            return Err(ConfigError::Invalid("PASSWORD_HASH_PROFILE"));
        }

        let defaults = HttpSettings::default();
        let http = HttpSettings::new(
            parse_or("REQUEST_TIMEOUT_SECONDS", defaults.request_timeout.as_secs())?,
            parse_or("REQUEST_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
        )?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            database_url,
            token_secret,
            token_ttl_seconds,
            password_hash_profile,
            http,
        })
    }
}

/// Unset falls back to `default`; set but unparseable is an error.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::Invalid(key))
        }
        _ => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
