//! Chirps module: posting, filtering and browsing short messages.
//!
//! This module implements:
//! - A 140 character limit on chirp bodies
//! - Whole-word profanity masking before storage
//! - Listing with an optional author filter and ascending/descending order
//! - Owner-only deletion
//!
//! ## Example
//!
//! ```no_run
//! use chirpy::auth::password;
//! use chirpy::chirps::{ChirpManager, SortOrder};
//! use chirpy::db::{MemoryStore, UserRepository};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let chirps = ChirpManager::new(store.clone());
//!     let author = store
//!         .create_user("walt@breakingbad.com", &password::hash("04234")?)
//!         .await?
//!         .id;
//!
//!     let chirp = chirps.create(author, "I had something interesting for breakfast").await?;
//!     println!("Posted {}", chirp.id);
//!
//!     let newest_first = chirps.list(Some(author), SortOrder::Desc).await?;
//!     println!("{} chirps", newest_first.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod profanity;

pub use errors::{ChirpError, ChirpResult};
pub use manager::ChirpManager;
pub use models::{Chirp, ChirpId, MAX_CHIRP_LENGTH, SortOrder};
