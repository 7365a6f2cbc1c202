use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::auth::credentials::{CredentialStore, CredentialStoreError, NewCredential};
use crate::services::auth::password::{PasswordError, PasswordScheme};
use crate::services::auth::principal::{DEFAULT_ROLE, Principal};

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("bad credentials")]
    BadCredentials,
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Store(CredentialStoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<CredentialStoreError> for LoginError {
    fn from(e: CredentialStoreError) -> Self {
        match e {
            CredentialStoreError::Conflict => LoginError::UsernameTaken,
            other => LoginError::Store(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Checks submitted credentials against the credential store and registers
/// new accounts. Token issuance stays with the caller.
#[derive(Clone)]
pub struct LoginService {
    credentials: Arc<dyn CredentialStore>,
    passwords: Arc<dyn PasswordScheme>,
    // Verified against when the username is unknown, so a miss costs the same
    // as a wrong password.
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService").finish_non_exhaustive()
    }
}

impl LoginService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        passwords: Arc<dyn PasswordScheme>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = passwords.hash("not-a-real-password")?;
        Ok(Self {
            credentials,
            passwords,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, LoginError> {
        let stored = self.credentials.find_by_username(username).await?;

        let hash: Arc<str> = match &stored {
            Some(s) => s.password_hash.as_str().into(),
            None => self.dummy_hash.clone(),
        };
        let password_ok = self.verify_password(password, hash).await?;

        match stored {
            Some(s) if password_ok && s.enabled => {
                info!(username = %s.username, "login succeeded");
                Ok(s.principal())
            }
            Some(s) if password_ok => {
                warn!(username = %s.username, "login rejected: account disabled");
                Err(LoginError::BadCredentials)
            }
            _ => {
                warn!(username = %username, "login rejected: bad credentials");
                Err(LoginError::BadCredentials)
            }
        }
    }

    pub async fn register(&self, signup: Signup) -> Result<Principal, LoginError> {
        if self
            .credentials
            .find_by_username(&signup.username)
            .await?
            .is_some()
        {
            debug!(username = %signup.username, "signup rejected: username taken");
            return Err(LoginError::UsernameTaken);
        }

        let password_hash = self.hash_password(signup.password).await?;
        let stored = self
            .credentials
            .register(NewCredential {
                username: signup.username,
                email: signup.email,
                password_hash,
                role: DEFAULT_ROLE.to_string(),
                enabled: true,
            })
            .await?;

        info!(username = %stored.username, id = stored.id, "account registered");
        Ok(stored.principal())
    }

    // Argon2 is deliberately slow; keep it off the async worker threads.
    async fn verify_password(&self, password: &str, hash: Arc<str>) -> Result<bool, PasswordError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|_| PasswordError::Worker)
    }

    async fn hash_password(&self, password: String) -> Result<String, PasswordError> {
        let passwords = self.passwords.clone();
        tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|_| PasswordError::Worker)?
    }
}
