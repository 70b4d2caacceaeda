//! Repository trait definitions for testability and dependency injection.
//!
//! This module provides trait-based abstractions over database operations,
//! with PostgreSQL implementations. Timestamps are stored as UTC `TIMESTAMP`
//! columns; see `migrations/0001_initial_schema.sql`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::auth::{
    AuthError, AuthResult, HashedCredential, RefreshTokenRecord, RefreshTokenRepository,
    RefreshTokenState, StoredUser, User, UserId,
};
use crate::chirps::{Chirp, ChirpError, ChirpId, ChirpResult};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    ///
    /// # Errors
    ///
    /// * `AuthError::EmailTaken` - Email already registered
    async fn create_user(&self, email: &str, password_hash: &HashedCredential)
    -> AuthResult<User>;

    /// Find user and stored credential by email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Replace email and password hash
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    /// * `AuthError::EmailTaken` - Email owned by another user
    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &HashedCredential,
    ) -> AuthResult<User>;

    /// Mark user as a Chirpy Red member
    ///
    /// # Errors
    ///
    /// * `AuthError::UserNotFound` - No such user
    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> AuthResult<()>;

    /// Delete all users; chirps and refresh tokens cascade
    async fn delete_all_users(&self) -> AuthResult<()>;
}

/// Trait for chirp repository operations
#[async_trait]
pub trait ChirpRepository: Send + Sync {
    /// Create a new chirp
    ///
    /// # Errors
    ///
    /// * `ChirpError::AuthorNotFound` - No user with `user_id`
    async fn create_chirp(&self, body: &str, user_id: UserId) -> ChirpResult<Chirp>;

    /// All chirps, oldest first
    async fn list_chirps(&self) -> ChirpResult<Vec<Chirp>>;

    /// Chirps by one author, oldest first
    async fn list_chirps_by_author(&self, author_id: UserId) -> ChirpResult<Vec<Chirp>>;

    /// Find chirp by ID
    async fn find_chirp(&self, chirp_id: ChirpId) -> ChirpResult<Option<Chirp>>;

    /// Delete a chirp if `author_id` owns it
    ///
    /// # Errors
    ///
    /// * `ChirpError::NotFound` - No chirp with this ID and author
    async fn delete_chirp(&self, chirp_id: ChirpId, author_id: UserId) -> ChirpResult<()>;
}

fn utc(row: &PgRow, column: &str) -> DateTime<Utc> {
    row.get::<NaiveDateTime, _>(column).and_utc()
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        is_chirpy_red: row.get("is_chirpy_red"),
        created_at: utc(row, "created_at"),
        updated_at: utc(row, "updated_at"),
    }
}

fn chirp_from_row(row: &PgRow) -> Chirp {
    Chirp {
        id: row.get("id"),
        created_at: utc(row, "created_at"),
        updated_at: utc(row, "updated_at"),
        body: row.get("body"),
        user_id: row.get("user_id"),
    }
}

/// Map a unique-constraint violation on `users.email` to `EmailTaken`
fn email_conflict(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(err),
    }
}

fn missing_author(err: sqlx::Error) -> ChirpError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ChirpError::AuthorNotFound
        }
        _ => ChirpError::Database(err),
    }
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &HashedCredential,
    ) -> AuthResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, email, hashed_password, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, email, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(email_conflict)?;

        Ok(user_from_row(&row))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>> {
        let row = sqlx::query(
            "SELECT id, email, hashed_password, is_chirpy_red, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StoredUser {
            user: user_from_row(&r),
            password_hash: HashedCredential::from_phc(r.get::<String, _>("hashed_password")),
        }))
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, is_chirpy_red, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_credentials(
        &self,
        user_id: UserId,
        email: &str,
        password_hash: &HashedCredential,
    ) -> AuthResult<User> {
        let row = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, hashed_password = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(password_hash.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(email_conflict)?
        .ok_or(AuthError::UserNotFound)?;

        Ok(user_from_row(&row))
    }

    async fn upgrade_to_chirpy_red(&self, user_id: UserId) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete_all_users(&self) -> AuthResult<()> {
        sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(())
    }
}

/// Default PostgreSQL implementation of `RefreshTokenRepository`
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn store(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at)
            VALUES ($1, $2, NOW(), NOW(), $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at.naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        let row = sqlx::query(
            "SELECT token, user_id, created_at, expires_at, revoked_at
             FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AuthError::RefreshTokenNotFound)?;

        let record = RefreshTokenRecord {
            token: row.get("token"),
            user_id: row.get("user_id"),
            created_at: utc(&row, "created_at"),
            expires_at: utc(&row, "expires_at"),
            revoked_at: row
                .get::<Option<NaiveDateTime>, _>("revoked_at")
                .map(|dt| dt.and_utc()),
        };

        match record.state_at(Utc::now()) {
            RefreshTokenState::Active => Ok(record.user_id),
            RefreshTokenState::Expired => Err(AuthError::RefreshTokenExpired),
            RefreshTokenState::Revoked => Err(AuthError::RefreshTokenRevoked),
        }
    }

    async fn revoke(&self, token: &str) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, NOW()), updated_at = NOW()
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::RefreshTokenNotFound);
        }
        Ok(())
    }
}

/// Default PostgreSQL implementation of `ChirpRepository`
pub struct PgChirpRepository {
    pool: PgPool,
}

impl PgChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChirpRepository for PgChirpRepository {
    async fn create_chirp(&self, body: &str, user_id: UserId) -> ChirpResult<Chirp> {
        let row = sqlx::query(
            r#"
            INSERT INTO chirps (id, body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, body, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(missing_author)?;

        Ok(chirp_from_row(&row))
    }

    async fn list_chirps(&self) -> ChirpResult<Vec<Chirp>> {
        let rows = sqlx::query(
            "SELECT id, body, user_id, created_at, updated_at
             FROM chirps ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chirp_from_row).collect())
    }

    async fn list_chirps_by_author(&self, author_id: UserId) -> ChirpResult<Vec<Chirp>> {
        let rows = sqlx::query(
            "SELECT id, body, user_id, created_at, updated_at
             FROM chirps WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(chirp_from_row).collect())
    }

    async fn find_chirp(&self, chirp_id: ChirpId) -> ChirpResult<Option<Chirp>> {
        let row = sqlx::query(
            "SELECT id, body, user_id, created_at, updated_at FROM chirps WHERE id = $1",
        )
        .bind(chirp_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(chirp_from_row))
    }

    async fn delete_chirp(&self, chirp_id: ChirpId, author_id: UserId) -> ChirpResult<()> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1 AND user_id = $2")
            .bind(chirp_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ChirpError::NotFound);
        }
        Ok(())
    }
}
