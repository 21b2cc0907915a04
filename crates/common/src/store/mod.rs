//! Row-store abstraction
//!
//! The datastore is a set of named tables of positional string rows,
//! matching the spreadsheet the system was built around. The store is
//! durable and single-writer-at-a-time; it offers no transactions, and
//! the core layers no retries on top of it.

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Table names, fixed for compatibility with the backing spreadsheet
pub mod tables {
    pub const ARTICLES: &str = "Database";
    pub const EDITORS: &str = "Logins";
    pub const KEYS: &str = "Keys";
    pub const AUTH_TOKENS: &str = "AuthTokens";
    pub const LOGS: &str = "Logs";
}

/// A positional storage row
pub type Row = Vec<String>;

/// Identifies rows by an exact cell value in one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMatch {
    pub column: usize,
    pub value: String,
}

impl RowMatch {
    pub fn new(column: usize, value: impl Into<String>) -> Self {
        Self { column, value: value.into() }
    }

    /// Whether a row satisfies this matcher
    pub fn matches(&self, row: &[String]) -> bool {
        row.get(self.column).map(String::as_str) == Some(self.value.as_str())
    }
}

/// Trait for the row-store collaborator
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch every row of a table, in storage order
    async fn get_all_rows(&self, table: &str) -> Result<Vec<Row>>;

    /// Append a row to the end of a table
    async fn append_row(&self, table: &str, row: Row) -> Result<()>;

    /// Replace the first matching row; returns whether a row matched
    async fn update_row(&self, table: &str, matcher: &RowMatch, row: Row) -> Result<bool>;

    /// Remove all matching rows; returns whether any row matched
    async fn delete_row(&self, table: &str, matcher: &RowMatch) -> Result<bool>;

    /// Check connectivity to the backend
    async fn ping(&self) -> Result<()>;
}

/// Create a row store based on configuration
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn RowStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "rest" => {
            let base_url = config.base_url.clone().ok_or_else(|| AppError::Configuration {
                message: "storage.base_url is required for the rest backend".to_string(),
            })?;
            Ok(Arc::new(RestStore::new(base_url, config.timeout_secs)))
        }
        other => Err(AppError::Configuration {
            message: format!("Unknown storage backend: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_match() {
        let matcher = RowMatch::new(1, "ed@example.com");
        assert!(matcher.matches(&["Ed".into(), "ed@example.com".into()]));
        assert!(!matcher.matches(&["Ed".into(), "other@example.com".into()]));
        assert!(!matcher.matches(&["Ed".into()]));
    }

    #[test]
    fn test_create_store_rejects_unknown_backend() {
        let config = StorageConfig {
            backend: "carrier-pigeon".into(),
            base_url: None,
            timeout_secs: 10,
        };
        assert!(create_store(&config).is_err());
    }

    #[test]
    fn test_create_store_rest_requires_url() {
        let config = StorageConfig {
            backend: "rest".into(),
            base_url: None,
            timeout_secs: 10,
        };
        assert!(create_store(&config).is_err());
    }
}
