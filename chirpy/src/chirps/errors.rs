//! Chirp error types.

use thiserror::Error;

use super::models::MAX_CHIRP_LENGTH;

/// Chirp errors
#[derive(Debug, Error)]
pub enum ChirpError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Body over the length limit
    #[error("Chirp is too long: {length} characters, limit is {MAX_CHIRP_LENGTH}")]
    TooLong { length: usize },

    /// Body empty or whitespace
    #[error("Chirp body must not be empty")]
    EmptyBody,

    /// Chirp not found
    #[error("Chirp not found")]
    NotFound,

    /// Author account no longer exists
    #[error("User not found")]
    AuthorNotFound,

    /// Caller does not own the chirp
    #[error("Only the owner of the chirp may delete it")]
    NotOwner,
}

impl ChirpError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize database errors - don't expose SQL details
            ChirpError::Database(_) => "Internal server error".to_string(),
            ChirpError::TooLong { .. } => {
                format!("Chirps can only be {MAX_CHIRP_LENGTH} characters long")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for chirp operations
pub type ChirpResult<T> = Result<T, ChirpError>;
