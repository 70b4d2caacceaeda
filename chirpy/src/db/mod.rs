//! Database module providing PostgreSQL connection pooling and repositories.
//!
//! Managers never touch the pool directly; they go through the repository
//! traits in [`repository`], which have a PostgreSQL implementation and an
//! in-memory one ([`MemoryStore`]) for tests.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::{sync::Arc, time::Duration};

pub mod config;
pub mod memory;
pub mod repository;

pub use crate::auth::RefreshTokenRepository;
pub use config::DatabaseConfig;
pub use memory::MemoryStore;
pub use repository::{
    ChirpRepository, PgChirpRepository, PgRefreshTokenRepository, PgUserRepository,
    UserRepository,
};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Repository handles sharing one pool
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
}

impl Repositories {
    /// All three repositories backed by one in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            chirps: store,
        }
    }
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chirpy::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::new("postgres://postgres@localhost/chirpy");
    ///     let db = Database::new(&config).await?;
    ///     db.health_check().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// PostgreSQL-backed repositories sharing this pool
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(PgUserRepository::new(self.pool.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(self.pool.clone())),
            chirps: Arc::new(PgChirpRepository::new(self.pool.clone())),
        }
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
