//! # Connection Registry
//!
//! Lists the database connection identifiers that receive the SQL rollout.
//!
//! The registry is always passed into the graph build explicitly so that tests
//! and dry runs can substitute [`InMemoryConnectionRegistry`] for the
//! Postgres-backed [`PgConnectionRegistry`].
//!
//! ```text
//! ConnectionRegistry
//! ├── PgConnectionRegistry        (scheduler metadata `connection` table)
//! └── InMemoryConnectionRegistry  (fixed list)
//! ```

mod in_memory;
#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;

use crate::error::Result;

pub use in_memory::InMemoryConnectionRegistry;
#[cfg(feature = "postgres")]
pub use postgres::PgConnectionRegistry;

/// Read access to registered connection identifiers
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Identifiers starting with `prefix`, in the order the backend returns them.
    ///
    /// An unreachable backend is an error; callers must not build a partial graph.
    async fn list_connection_ids(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Escape `LIKE` metacharacters so the prefix matches literally.
///
/// `db_` must not match `dbx_orders`: an unescaped `_` is a single-character
/// wildcard in SQL.
pub fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 2);
    for ch in prefix.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
