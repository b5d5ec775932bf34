use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{Result, WorkflowError};

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Open a small pool against the registry database and check that the
    /// `connection` table is there.
    pub async fn connect(config: &RegistryConfig) -> Result<Self> {
        debug!(max_connections = config.max_connections, "Connecting to registry database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.database_url)
            .await
            .map_err(|e| WorkflowError::DatabaseError(format!("registry unreachable: {e}")))?;

        verify_registry_table(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Fails with a readable error when the database has no `connection` table,
/// e.g. a `DATABASE_URL` pointing at the wrong database.
pub async fn verify_registry_table(pool: &PgPool) -> Result<()> {
    let present: bool = sqlx::query_scalar("SELECT to_regclass('connection') IS NOT NULL")
        .fetch_one(pool)
        .await?;

    if present {
        Ok(())
    } else {
        Err(WorkflowError::DatabaseError(
            "registry database has no `connection` table".to_string(),
        ))
    }
}
