//! Chirp manager implementation.

use super::{
    errors::{ChirpError, ChirpResult},
    models::{Chirp, ChirpId, MAX_CHIRP_LENGTH, SortOrder},
    profanity,
};
use crate::{auth::UserId, db::ChirpRepository};
use log::info;
use std::sync::Arc;

/// Chirp manager
#[derive(Clone)]
pub struct ChirpManager {
    repository: Arc<dyn ChirpRepository>,
}

impl ChirpManager {
    pub fn new(repository: Arc<dyn ChirpRepository>) -> Self {
        Self { repository }
    }

    /// Post a chirp on behalf of `author`
    ///
    /// The body is length-checked before profanity masking and stored masked.
    ///
    /// # Errors
    ///
    /// * `ChirpError::EmptyBody` - Body is blank
    /// * `ChirpError::TooLong` - Body exceeds 140 characters
    /// * `ChirpError::AuthorNotFound` - Author was deleted after signing in
    pub async fn create(&self, author: UserId, body: &str) -> ChirpResult<Chirp> {
        validate_body(body)?;

        let cleaned = profanity::clean(body);
        let chirp = self.repository.create_chirp(&cleaned, author).await?;

        info!("User {} posted chirp {}", author, chirp.id);
        Ok(chirp)
    }

    /// List chirps, optionally by one author, ordered by creation time
    pub async fn list(&self, author: Option<UserId>, order: SortOrder) -> ChirpResult<Vec<Chirp>> {
        let mut chirps = match author {
            Some(author_id) => self.repository.list_chirps_by_author(author_id).await?,
            None => self.repository.list_chirps().await?,
        };

        order.apply(&mut chirps);
        Ok(chirps)
    }

    /// Get a chirp by ID
    pub async fn get(&self, chirp_id: ChirpId) -> ChirpResult<Chirp> {
        self.repository
            .find_chirp(chirp_id)
            .await?
            .ok_or(ChirpError::NotFound)
    }

    /// Delete a chirp owned by `requester`
    ///
    /// # Errors
    ///
    /// * `ChirpError::NotFound` - No such chirp
    /// * `ChirpError::NotOwner` - Chirp belongs to someone else
    pub async fn delete(&self, chirp_id: ChirpId, requester: UserId) -> ChirpResult<()> {
        let chirp = self.get(chirp_id).await?;
        if chirp.user_id != requester {
            return Err(ChirpError::NotOwner);
        }

        self.repository.delete_chirp(chirp_id, requester).await?;
        info!("User {} deleted chirp {}", requester, chirp_id);
        Ok(())
    }
}

/// Validate a chirp body before masking
fn validate_body(body: &str) -> ChirpResult<()> {
    if body.trim().is_empty() {
        return Err(ChirpError::EmptyBody);
    }

    let length = body.chars().count();
    if length > MAX_CHIRP_LENGTH {
        return Err(ChirpError::TooLong { length });
    }

    Ok(())
}
