//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the algorithm parameters and salt
//! travel with the hash and verification needs nothing else.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, Salt, SaltString,
        rand_core::{OsRng, RngCore},
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{HashingFailure, MismatchError};

/// Salted one-way hash of a password, in PHC string format
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Wrap a PHC string loaded from storage
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedCredential(..)")
    }
}

/// Hash a password with Argon2id and a fresh random salt
///
/// Default Argon2 parameters (19 MiB, 2 passes) cost tens of milliseconds,
/// so async callers should run this on a blocking thread.
///
/// # Errors
///
/// * `HashingFailure` - The OS random source could not supply a salt
pub fn hash(password: &str) -> Result<HashedCredential, HashingFailure> {
    let mut salt_bytes = [0u8; Salt::RECOMMENDED_LENGTH];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .map_err(|_| HashingFailure)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| HashingFailure)?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| HashingFailure)?;

    Ok(HashedCredential(hash.to_string()))
}

/// Verify a candidate password against a stored credential
///
/// # Errors
///
/// * `MismatchError` - Wrong password or unparseable hash, indistinguishably
pub fn verify(hashed: &HashedCredential, candidate: &str) -> Result<(), MismatchError> {
    let parsed = PasswordHash::new(hashed.as_str()).map_err(|_| MismatchError)?;

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|_| MismatchError)
}
