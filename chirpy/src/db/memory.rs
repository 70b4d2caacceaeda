//! In-memory repository implementation.
//!
//! `MemoryStore` implements every repository trait over one lock, so the
//! cascade in `delete_all_users` is atomic. It backs unit tests and the
//! server's integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::{ChirpRepository, UserRepository};
use crate::auth::{
    AuthError, AuthResult, HashedCredential, RefreshTokenRecord, RefreshTokenRepository,
    RefreshTokenState, StoredUser, User, UserId,
};
use crate::chirps::{Chirp, ChirpError, ChirpId, ChirpResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, StoredUser>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
    // Insertion order doubles as creation order
    chirps: Vec<Chirp>,
}

impl State {
    fn email_taken_by_other(&self, email: &str, user_id: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|s| s.user.email == email && Some(s.user.id) != user_id)
    }
}

/// Repository implementation holding everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.state.lock().await.users.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &HashedCredential,
    ) -> AuthResult<User> {
        let mut state = self.state.lock().await;
        if state.email_taken_by_other(email, None) {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|s| s.user.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.get(&user_id).map(|s| s.user.clone()))
    }

    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &HashedCredential,
    ) -> AuthResult<User> {
        let mut state = self.state.lock().await;
        if state.email_taken_by_other(email, Some(user_id)) {
            return Err(AuthError::EmailTaken);
        }

        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or(AuthError::UserNotFound)?;
        stored.user.email = email.to_string();
        stored.user.updated_at = Utc::now();
        stored.password_hash = password_hash.clone();
        Ok(stored.user.clone())
    }

    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or(AuthError::UserNotFound)?;
        stored.user.is_chirpy_red = true;
        stored.user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all_users(&self) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        state.users.clear();
        state.refresh_tokens.clear();
        state.chirps.clear();
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn store(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        let record = RefreshTokenRecord {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
        };
        self.state
            .lock()
            .await
            .refresh_tokens
            .insert(record.token.clone(), record);
        Ok(())
    }

    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        let state = self.state.lock().await;
        let record = state
            .refresh_tokens
            .get(token)
            .ok_or(AuthError::RefreshTokenNotFound)?;

        match record.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(record.user_id),
            RefreshTokenState::Expired => Err(AuthError::RefreshTokenExpired),
            RefreshTokenState::Revoked => Err(AuthError::RefreshTokenRevoked),
        }
    }

    async fn revoke(&self, token: &str) -> AuthResult<()> {
        let mut state = self.state.lock().await;
        let record = state
            .refresh_tokens
            .get_mut(token)
            .ok_or(AuthError::RefreshTokenNotFound)?;
        record.revoked_at.get_or_insert_with(Utc::now);
        Ok(())
    }
}

#[async_trait]
impl ChirpRepository for MemoryStore {
    async fn create_chirp(&self, body: &str, user_id: UserId) -> ChirpResult<Chirp> {
        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&user_id) {
            return Err(ChirpError::AuthorNotFound);
        }
        state.chirps.push(chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self) -> ChirpResult<Vec<Chirp>> {
        Ok(self.state.lock().await.chirps.clone())
    }

    async fn list_chirps_by_author(&self, author_id: UserId) -> ChirpResult<Vec<Chirp>> {
        let state = self.state.lock().await;
        Ok(state
            .chirps
            .iter()
            .filter(|c| c.user_id == author_id)
            .cloned()
            .collect())
    }

    async fn find_chirp(&self, chirp_id: ChirpId) -> ChirpResult<Option<Chirp>> {
        let state = self.state.lock().await;
        Ok(state.chirps.iter().find(|c| c.id == chirp_id).cloned())
    }

    async fn delete_chirp(&self, chirp_id: ChirpId, author_id: UserId) -> ChirpResult<()> {
        let mut state = self.state.lock().await;
        let position = state
            .chirps
            .iter()
            .position(|c| c.id == chirp_id && c.user_id == author_id)
            .ok_or(ChirpError::NotFound)?;
        state.chirps.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn credential() -> HashedCredential {
        HashedCredential::from_phc("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA")
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user("a@b.io", &credential()).await.unwrap();

        let result = store.create_user("a@b.io", &credential()).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_update_credentials() {
        let store = MemoryStore::new();
        let user = store.create_user("a@b.io", &credential()).await.unwrap();
        store.create_user("c@d.io", &credential()).await.unwrap();

        let taken = store.update_credentials(user.id, "c@d.io", &credential()).await;
        assert!(matches!(taken, Err(AuthError::EmailTaken)));

        // Keeping your own email is fine
        let same = store.update_credentials(user.id, "a@b.io", &credential()).await;
        assert!(same.is_ok());

        let missing = store
            .update_credentials(Uuid::new_v4(), "x@y.io", &credential())
            .await;
        assert!(matches!(missing, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_upgrade_to_chirpy_red() {
        let store = MemoryStore::new();
        let user = store.create_user("a@b.io", &credential()).await.unwrap();
        assert!(!user.is_chirpy_red);

        store.upgrade_to_chirpy_red(user.id).await.unwrap();
        let found = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(found.is_chirpy_red);

        assert!(matches!(
            store.upgrade_to_chirpy_red(Uuid::new_v4()).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(60);

        store.store("tok", user_id, expires_at).await.unwrap();
        assert_eq!(store.resolve("tok").await.unwrap(), user_id);
        // Resolving does not consume the token
        assert_eq!(store.resolve("tok").await.unwrap(), user_id);

        store.revoke("tok").await.unwrap();
        store.revoke("tok").await.unwrap();
        assert!(matches!(
            store.resolve("tok").await,
            Err(AuthError::RefreshTokenRevoked)
        ));

        assert!(matches!(
            store.resolve("other").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
        assert!(matches!(
            store.revoke("other").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let store = MemoryStore::new();
        store
            .store("old", Uuid::new_v4(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert!(matches!(
            store.resolve("old").await,
            Err(AuthError::RefreshTokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_delete_chirp_requires_author() {
        let store = MemoryStore::new();
        let author = store.create_user("a@b.io", &credential()).await.unwrap().id;
        let chirp = store.create_chirp("hello", author).await.unwrap();

        assert!(matches!(
            store.delete_chirp(chirp.id, Uuid::new_v4()).await,
            Err(ChirpError::NotFound)
        ));
        store.delete_chirp(chirp.id, author).await.unwrap();
        assert!(store.find_chirp(chirp.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_users_cascades() {
        let store = MemoryStore::new();
        let user = store.create_user("a@b.io", &credential()).await.unwrap();
        store
            .store("tok", user.id, Utc::now() + Duration::days(1))
            .await
            .unwrap();
        store.create_chirp("hello", user.id).await.unwrap();

        store.delete_all_users().await.unwrap();

        assert_eq!(store.user_count().await, 0);
        assert!(store.list_chirps().await.unwrap().is_empty());
        assert!(matches!(
            store.resolve("tok").await,
            Err(AuthError::RefreshTokenNotFound)
        ));
    }
}
