//! Authentication manager implementation.

use super::{
    bearer,
    errors::{AuthError, AuthResult},
    models::{LoginRequest, RegisterRequest, SessionTokens, UpdateUserRequest, User, UserId},
    password::{self, HashedCredential},
    refresh::{self, RefreshTokenRepository},
    token,
};
use crate::db::UserRepository;
use chrono::{Duration, Utc};
use log::{info, warn};
use std::sync::Arc;

/// Maximum accepted email length (RFC 5321 path limit)
const MAX_EMAIL_LEN: usize = 254;

/// Argon2id hash with the default cost parameters that matches no password.
/// Verified against on unknown-email logins so both failures cost the same.
const UNKNOWN_USER_CREDENTIAL: &str = "$argon2id$v=19$m=19456,t=2,p=1$dwZNhAd+NTKYQFVUa1UjmA$ccI0Kj+8DV0vuXODwKcOGrZYZ+hf4v+S+GgRFDddgcU";

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    jwt_secret: Arc<[u8]>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User repository
    /// * `refresh_tokens` - Refresh token repository
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        jwt_secret: String,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt_secret: Arc::from(jwt_secret.into_bytes()),
            access_token_duration: Duration::hours(1),
            refresh_token_duration: Duration::days(refresh::REFRESH_TOKEN_TTL_DAYS),
        }
    }

    /// Override the access token lifetime
    pub fn with_access_token_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Access token lifetime
    pub fn access_token_duration(&self) -> Duration {
        self.access_token_duration
    }

    /// Register a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidEmail` - Email format invalid
    /// * `AuthError::WeakPassword` - Password empty
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::Hashing` - Salt generation failed
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(request.password).await?;
        let user = self.users.create_user(&request.email, &password_hash).await?;

        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// Issues a fresh access token and a refresh token stored for 60 days.
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No user with this email
    /// * `AuthError::InvalidPassword` - Incorrect password
    /// * `AuthError::Entropy` - Refresh token could not be generated
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let Some(stored) = self.users.find_by_email(&request.email).await? else {
            let placeholder = HashedCredential::from_phc(UNKNOWN_USER_CREDENTIAL);
            let _ = verify_password(placeholder, request.password).await;
            warn!("Failed login for unknown email");
            return Err(AuthError::UserNotFound);
        };

        if let Err(e) = verify_password(stored.password_hash, request.password).await {
            warn!("Failed login for user {}", stored.user.id);
            return Err(e);
        }

        let tokens = self.create_session(stored.user.id).await?;

        info!("User {} logged in", stored.user.id);
        Ok((stored.user, tokens))
    }

    /// Create a new session with access and refresh tokens
    async fn create_session(&self, user_id: UserId) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(user_id)?;

        let refresh_token = refresh::generate()?;
        let expires_at = Utc::now() + self.refresh_token_duration;
        self.refresh_tokens
            .store(&refresh_token, user_id, expires_at)
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token
    ///
    /// The refresh token stays active; only `revoke` or expiry ends it.
    ///
    /// # Errors
    ///
    /// * `AuthError::RefreshTokenNotFound` - Unknown or malformed token
    /// * `AuthError::RefreshTokenExpired` - Token past its expiry
    /// * `AuthError::RefreshTokenRevoked` - Token revoked
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<String> {
        if !refresh::is_well_formed(refresh_token) {
            return Err(AuthError::RefreshTokenNotFound);
        }

        let user_id = self.refresh_tokens.resolve(refresh_token).await?;
        self.generate_access_token(user_id)
    }

    /// Revoke a refresh token
    ///
    /// # Errors
    ///
    /// * `AuthError::RefreshTokenNotFound` - Token was never issued
    pub async fn revoke(&self, refresh_token: &str) -> AuthResult<()> {
        if !refresh::is_well_formed(refresh_token) {
            return Err(AuthError::RefreshTokenNotFound);
        }

        self.refresh_tokens.revoke(refresh_token).await
    }

    /// Verify an access token
    pub fn verify_access_token(&self, token: &str) -> AuthResult<UserId> {
        Ok(token::validate(token, &self.jwt_secret)?)
    }

    /// Resolve the user behind an `Authorization: Bearer` header value
    pub fn authenticate(&self, authorization: Option<&str>) -> AuthResult<UserId> {
        let token = bearer::extract(authorization)?;
        self.verify_access_token(token)
    }

    /// Replace the email and password of an existing user
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - User no longer exists
    /// * `AuthError::EmailTaken` - Another user owns the new email
    pub async fn update_credentials(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> AuthResult<User> {
        validate_email(&request.email)?;
        validate_password(&request.password)?;

        let password_hash = hash_password(request.password).await?;
        self.users
            .update_credentials(user_id, &request.email, &password_hash)
            .await
    }

    /// Grant Chirpy Red membership
    pub async fn upgrade_to_red(&self, user_id: UserId) -> AuthResult<()> {
        self.users.upgrade_to_chirpy_red(user_id).await?;
        info!("User {} upgraded to Chirpy Red", user_id);
        Ok(())
    }

    /// Delete every user, with their chirps and refresh tokens
    pub async fn reset(&self) -> AuthResult<()> {
        warn!("Deleting all users");
        self.users.delete_all_users().await
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user_id: UserId) -> AuthResult<String> {
        Ok(token::mint(
            user_id,
            &self.jwt_secret,
            self.access_token_duration,
        )?)
    }
}

/// Hash on the blocking pool; Argon2 takes tens of milliseconds
async fn hash_password(password: String) -> AuthResult<HashedCredential> {
    let hashed = tokio::task::spawn_blocking(move || password::hash(&password)).await??;
    Ok(hashed)
}

async fn verify_password(hashed: HashedCredential, candidate: String) -> AuthResult<()> {
    tokio::task::spawn_blocking(move || password::verify(&hashed, &candidate)).await??;
    Ok(())
}

/// Validate email format
fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(AuthError::InvalidEmail(format!(
            "Email must be 1-{MAX_EMAIL_LEN} characters"
        )));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AuthError::InvalidEmail(
            "Email must contain a local part and a domain".to_string(),
        )),
    }
}

/// Validate password before hashing
fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword(
            "Password must not be empty".to_string(),
        ));
    }

    Ok(())
}
