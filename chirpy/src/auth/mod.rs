//! Authentication module providing credential hashing, access tokens and
//! refresh-token sessions.
//!
//! This module implements:
//! - Argon2id password hashing ([`password`])
//! - HS256 JWT access tokens, 1-hour expiry ([`token`])
//! - `Authorization` header parsing ([`bearer`])
//! - Opaque 256-bit refresh tokens, 60-day expiry ([`refresh`])
//!
//! The primitives never log and never talk to storage. [`AuthManager`] wires
//! them to the user and refresh-token repositories.
//!
//! ## Example
//!
//! ```no_run
//! use chirpy::auth::{AuthManager, LoginRequest, RegisterRequest};
//! use chirpy::db::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let auth = AuthManager::new(store.clone(), store, "jwt_secret".to_string());
//!
//!     auth.register(RegisterRequest {
//!         email: "walt@breakingbad.com".to_string(),
//!         password: "04234".to_string(),
//!     })
//!     .await?;
//!
//!     let (user, tokens) = auth
//!         .login(LoginRequest {
//!             email: "walt@breakingbad.com".to_string(),
//!             password: "04234".to_string(),
//!         })
//!         .await?;
//!     println!("{} logged in with {}", user.email, tokens.access_token);
//!     Ok(())
//! }
//! ```

pub mod bearer;
pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod refresh;
pub mod token;

pub use errors::{
    AuthError, AuthResult, EntropySourceFailure, ExtractError, HashingFailure, MismatchError,
    TokenError,
};
pub use manager::AuthManager;
pub use models::{
    LoginRequest, RegisterRequest, SessionTokens, StoredUser, UpdateUserRequest, User, UserId,
};
pub use password::HashedCredential;
pub use refresh::{RefreshTokenRecord, RefreshTokenRepository, RefreshTokenState};
pub use token::AccessTokenClaims;
