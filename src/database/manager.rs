use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const PROJECTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS projects (
        id          TEXT PRIMARY KEY CHECK (id ~ '^[0-9a-fA-F]{24}$'),
        name        TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        files       JSONB NOT NULL DEFAULT '{}'::jsonb,
        user_id     TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const PROJECTS_INDEX_DDL: &str = r#"
    CREATE INDEX IF NOT EXISTS projects_user_id_updated_at_idx
        ON projects (user_id, updated_at DESC)
"#;

/// Builds the process-wide connection pool; the pool is created once at startup
/// and shared by every request.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Create the projects table and its listing index when absent
    pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(PROJECTS_DDL).execute(pool).await?;
        sqlx::query(PROJECTS_INDEX_DDL).execute(pool).await?;
        info!("Ensured projects table exists");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_database_url() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
            bootstrap_schema: false,
        };
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }
}
