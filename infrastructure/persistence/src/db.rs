use std::sync::Arc;
use std::{path::Path, time::Duration};

use business::domain::logger::Logger;
use sqlx::{PgPool, postgres::PgPoolOptions};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("database.not_configured")]
    NotConfigured,
    #[error("database.connection_error: {0}")]
    ConnectionError(#[source] sqlx::Error),
    #[error("database.migration_error: {0}")]
    MigrationError(String),
}

/// Configuration for the database connection
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub migrations_path: Option<String>,
}

impl DatabaseConfig {
    /// Creates a new database configuration with default values
    pub fn new(connection_string: String) -> Self {
        Self {
            connection_string,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            migrations_path: None,
        }
    }
}

/// Creates a PostgreSQL connection pool and checks it answers.
pub async fn create_postgres_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.connection_string)
        .await
        .map_err(DatabaseError::ConnectionError)?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::ConnectionError)?;

    Ok(pool)
}

/// Runs database migrations from the specified directory
pub async fn run_migrations(pool: &PgPool, migrations_path: &str) -> Result<(), DatabaseError> {
    let path = Path::new(migrations_path);

    if !path.exists() {
        return Err(DatabaseError::MigrationError(format!(
            "migrations directory {} not found",
            path.display()
        )));
    }

    sqlx::migrate::Migrator::new(path)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))
}

/// Lazily (re)established handle to the primary history store.
///
/// The pool is cached once a connection succeeds. While it is absent, every
/// call to [`PrimaryConnection::pool`] makes one connection attempt; there is
/// no retry loop and no cooldown. Concurrent attempts may race, the last
/// successful one is kept.
pub struct PrimaryConnection {
    config: Option<DatabaseConfig>,
    pool: RwLock<Option<PgPool>>,
    logger: Arc<dyn Logger>,
}

impl PrimaryConnection {
    /// `config` is `None` when no connection string was provided; the handle
    /// then stays absent for the lifetime of the process.
    pub fn new(config: Option<DatabaseConfig>, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
            logger,
        }
    }

    /// Makes one connection attempt and caches the pool on success.
    pub async fn reconnect(&self) -> Result<PgPool, DatabaseError> {
        let Some(config) = self.config.as_ref() else {
            self.logger
                .debug("Primary history store not configured, skipping connection");
            return Err(DatabaseError::NotConfigured);
        };

        let pool = match create_postgres_pool(config).await {
            Ok(pool) => pool,
            Err(e) => {
                self.logger
                    .error(&format!("Primary history store connection failed: {}", e));
                return Err(e);
            }
        };

        if let Some(migrations_path) = config.migrations_path.as_deref() {
            if let Err(e) = run_migrations(&pool, migrations_path).await {
                self.logger
                    .error(&format!("Primary history store migrations failed: {}", e));
                return Err(e);
            }
        }

        *self.pool.write().await = Some(pool.clone());
        self.logger.info("Connected to primary history store");
        Ok(pool)
    }

    /// Returns the cached pool, attempting a reconnection when there is none.
    pub async fn pool(&self) -> Option<PgPool> {
        if let Some(pool) = self.pool.read().await.as_ref() {
            return Some(pool.clone());
        }
        self.reconnect().await.ok()
    }
}
