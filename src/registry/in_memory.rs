use async_trait::async_trait;

use super::ConnectionRegistry;
use crate::error::Result;

/// Fixed list of connection identifiers
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnectionRegistry {
    connection_ids: Vec<String>,
}

impl InMemoryConnectionRegistry {
    pub fn new<I, S>(connection_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            connection_ids: connection_ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn list_connection_ids(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .connection_ids
            .iter()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }
}
