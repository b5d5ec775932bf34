use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::{like_prefix_pattern, ConnectionRegistry};
use crate::config::RegistryConfig;
use crate::database::DatabaseConnection;
use crate::error::Result;

/// Reads identifiers from the scheduler's `connection` table
#[derive(Debug, Clone)]
pub struct PgConnectionRegistry {
    pool: PgPool,
}

impl PgConnectionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &RegistryConfig) -> Result<Self> {
        let connection = DatabaseConnection::connect(config).await?;
        Ok(Self::new(connection.pool().clone()))
    }
}

#[async_trait]
impl ConnectionRegistry for PgConnectionRegistry {
    async fn list_connection_ids(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = like_prefix_pattern(prefix);
        debug!(pattern = %pattern, "Querying connection registry");

        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT conn_id
            FROM connection
            WHERE conn_id LIKE $1 ESCAPE '\'
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = ids.len(), "Connection registry answered");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(pool: &PgPool, ids: &[&str]) {
        sqlx::query("CREATE TABLE IF NOT EXISTS connection (id SERIAL PRIMARY KEY, conn_id VARCHAR(250) NOT NULL UNIQUE)")
            .execute(pool)
            .await
            .unwrap();
        for id in ids {
            sqlx::query("INSERT INTO connection (conn_id) VALUES ($1)")
                .bind(*id)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
    async fn test_prefix_is_matched_literally(pool: PgPool) {
        seed(&pool, &["db_orders", "dbx_orders", "db_billing", "telegram_conn_id"]).await;

        let registry = PgConnectionRegistry::new(pool);
        let mut ids = registry.list_connection_ids("db_").await.unwrap();
        ids.sort();

        assert_eq!(ids, vec!["db_billing", "db_orders"]);
    }
}
