//! Persistence: PostgreSQL pool, repositories and the in-memory store.

use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::MemoryRepository;
pub use repository::{BracketRepository, PgRepository, TournamentRepository};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cue_bracket::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let db = Database::new(&DatabaseConfig::from_env()).await?;
    ///     db.run_migrations().await?;
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

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled schema migrations
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Repository over this pool
    pub fn repository(&self) -> PgRepository {
        PgRepository::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL instance"]
    async fn test_database_connection() {
        let config = DatabaseConfig {
            max_connections: 2,
            ..DatabaseConfig::from_env()
        };

        let db = Database::new(&config)
            .await
            .expect("Failed to connect to database");
        db.run_migrations().await.expect("Migrations failed");
        db.health_check().await.expect("Health check failed");
        db.close().await;
    }
}
