//! Opaque refresh tokens.
//!
//! A refresh token is 32 bytes from the operating system CSPRNG, hex encoded.
//! It has no internal structure; the repository that stores it decides which
//! user it belongs to and whether it is still usable.
//!
//! Lifecycle: `Issued -> Active -> {Revoked | Expired}`. Using a token to
//! refresh does not consume it. Revoked and expired tokens never become
//! active again.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};

use super::{
    errors::{AuthResult, EntropySourceFailure},
    models::UserId,
};

/// Random bytes per token (256 bits)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Refresh tokens stay valid for 60 days after issue
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

/// Generate a new refresh token from the OS random source
///
/// # Errors
///
/// * `EntropySourceFailure` - The OS source failed; there is no fallback
pub fn generate() -> Result<String, EntropySourceFailure> {
    generate_from(&mut OsRng)
}

/// Generate a refresh token from an arbitrary fallible source
pub fn generate_from<R>(rng: &mut R) -> Result<String, EntropySourceFailure>
where
    R: TryRngCore + ?Sized,
{
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|_| EntropySourceFailure)?;
    Ok(hex::encode(bytes))
}

/// Whether `token` has the shape of an issued refresh token
pub fn is_well_formed(token: &str) -> bool {
    token.len() == REFRESH_TOKEN_BYTES * 2
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Default expiry for a token issued at `issued_at`
pub fn default_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::days(REFRESH_TOKEN_TTL_DAYS)
}

/// Refresh token state as seen by a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Revoked,
    Expired,
}

/// Stored refresh token row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    /// State at `now`. Revocation wins over expiry.
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.revoked_at.is_some() {
            RefreshTokenState::Revoked
        } else if self.expires_at <= now {
            RefreshTokenState::Expired
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Storage contract for refresh tokens
///
/// Implementations own expiry bookkeeping, revocation and any transactional
/// ordering between concurrent `resolve` and `revoke` calls.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a newly issued token
    async fn store(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()>;

    /// Look up the owner of an active token
    ///
    /// # Errors
    ///
    /// * `AuthError::RefreshTokenNotFound` - Never issued
    /// * `AuthError::RefreshTokenExpired` - Past `expires_at`
    /// * `AuthError::RefreshTokenRevoked` - Revoked
    async fn resolve(&self, token: &str) -> AuthResult<UserId>;

    /// Revoke a token. Revoking an already revoked token succeeds.
    ///
    /// # Errors
    ///
    /// * `AuthError::RefreshTokenNotFound` - Never issued
    async fn revoke(&self, token: &str) -> AuthResult<()>;
}
