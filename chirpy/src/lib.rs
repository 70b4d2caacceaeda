//! # Chirpy
//!
//! Core library for a small social posting service: users register, log in,
//! post short messages ("chirps") and browse them.
//!
//! ## Architecture
//!
//! The crate is split into three layers:
//!
//! - **Auth primitives**: password hashing, JWT access tokens, bearer header
//!   parsing and opaque refresh tokens. These are synchronous and hold no state.
//! - **Managers**: [`auth::AuthManager`] and [`chirps::ChirpManager`] orchestrate
//!   the primitives against repository traits.
//! - **Persistence**: [`db`] provides the PostgreSQL pool, the repository
//!   implementations and an in-memory store for tests.
//!
//! ## Core Modules
//!
//! - [`auth`]: Credentials, tokens and session management
//! - [`chirps`]: Chirp validation, profanity filtering and listing
//! - [`db`]: Connection pooling and repositories
//!
//! ## Example
//!
//! ```
//! use chirpy::auth::{bearer, token};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let user_id = Uuid::new_v4();
//! let jwt = token::mint(user_id, b"secret", Duration::hours(1)).unwrap();
//! let header = format!("Bearer {jwt}");
//!
//! let raw = bearer::extract(Some(&header)).unwrap();
//! assert_eq!(token::validate(raw, b"secret").unwrap(), user_id);
//! ```

/// Authentication primitives and session management.
pub mod auth;
pub use auth::{AuthError, AuthManager, AuthResult, User, UserId};

/// Chirp posting and browsing.
pub mod chirps;
pub use chirps::{Chirp, ChirpError, ChirpManager, ChirpResult, SortOrder};

/// Database connectivity and repositories.
pub mod db;
