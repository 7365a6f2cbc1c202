//! Password hashing seam.
//!
//! The credential store only ever sees opaque hash strings; which algorithm
//! produced them is decided by the `PasswordScheme` handed to `LoginService`.
//! Accounts created before the switch to Argon2 still carry BCrypt hashes,
//! which `DelegatingScheme` keeps verifiable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("hashing worker failed")]
    Worker,
}

pub trait PasswordScheme: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, PasswordError>;

    /// `false` both for a wrong password and for a hash this scheme cannot parse.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id with configurable cost.
#[derive(Debug, Clone)]
pub struct Argon2Scheme {
    params: Params,
}

impl Default for Argon2Scheme {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Scheme {
    /// Cheapest parameters argon2 accepts. Development and tests only.
    pub fn fast() -> Result<Self, PasswordError> {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordScheme for Argon2Scheme {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix))
}

/// Hashes new passwords with Argon2id and verifies whichever format a stored
/// hash is in: BCrypt (`$2a$`, `$2b$`, `$2y$`) or Argon2.
#[derive(Debug, Clone, Default)]
pub struct DelegatingScheme {
    argon2: Argon2Scheme,
}

impl DelegatingScheme {
    pub fn new(argon2: Argon2Scheme) -> Self {
        Self { argon2 }
    }
}

impl PasswordScheme for DelegatingScheme {
    fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        self.argon2.hash(plain)
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        if is_bcrypt(hash) {
            bcrypt::verify(plain, hash).unwrap_or(false)
        } else {
            self.argon2.verify(plain, hash)
        }
    }
}
