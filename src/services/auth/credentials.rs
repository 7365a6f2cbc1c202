use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicI64, Ordering},
};

use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::repos::{error::RepoError, user_repo};
use crate::services::auth::principal::{Principal, normalize_role};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What login needs to know about an account.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<String>,
    pub enabled: bool,
}

impl StoredCredential {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            roles: self.roles.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("username already taken")]
    Conflict,
    #[error("credential backend failure")]
    Backend(#[source] RepoError),
}

impl From<RepoError> for CredentialStoreError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => CredentialStoreError::Conflict,
            other => CredentialStoreError::Backend(other),
        }
    }
}

/// Lookup of stored password hashes and roles by username.
///
/// Implementations must not cache negative results across registrations; a
/// username that was free a moment ago may be taken now.
pub trait CredentialStore: Send + Sync {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredCredential>, CredentialStoreError>>;

    fn register(
        &self,
        credential: NewCredential,
    ) -> BoxFuture<'_, Result<StoredCredential, CredentialStoreError>>;
}

/// Process-local store. Used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredCredential>>,
    next_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredCredential>, CredentialStoreError>> {
        Box::pin(async move { Ok(self.users.read().await.get(username).cloned()) })
    }

    fn register(
        &self,
        credential: NewCredential,
    ) -> BoxFuture<'_, Result<StoredCredential, CredentialStoreError>> {
        Box::pin(async move {
            let mut users = self.users.write().await;
            if users.contains_key(&credential.username) {
                return Err(CredentialStoreError::Conflict);
            }

            let stored = StoredCredential {
                id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                username: credential.username.clone(),
                password_hash: credential.password_hash,
                roles: BTreeSet::from([normalize_role(&credential.role)]),
                enabled: credential.enabled,
            };
            users.insert(credential.username, stored.clone());

            Ok(stored)
        })
    }
}

/// Postgres-backed store over the application's existing `"user"` table.
///
/// The table carries a single `role` column, stored with the `ROLE_` prefix.
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn row_to_credential(row: user_repo::CredentialRow) -> StoredCredential {
    let roles = row
        .role
        .as_deref()
        .map(normalize_role)
        .filter(|r| !r.is_empty())
        .into_iter()
        .collect();

    StoredCredential {
        id: i64::from(row.id),
        username: row.name,
        password_hash: row.password,
        roles,
        enabled: row.enabled,
    }
}

impl CredentialStore for PgCredentialStore {
    fn find_by_username<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Option<StoredCredential>, CredentialStoreError>> {
        Box::pin(async move {
            let row = user_repo::find_by_name(&self.db, username).await?;
            Ok(row.map(row_to_credential))
        })
    }

    fn register(
        &self,
        credential: NewCredential,
    ) -> BoxFuture<'_, Result<StoredCredential, CredentialStoreError>> {
        Box::pin(async move {
            let role = format!("ROLE_{}", normalize_role(&credential.role));
            let row = user_repo::create(
                &self.db,
                &credential.username,
                &credential.email,
                &credential.password_hash,
                &role,
            )
            .await?;
            Ok(row_to_credential(row))
        })
    }
}
