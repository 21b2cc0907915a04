//! In-memory row store for tests and local development

use super::{Row, RowMatch, RowStore};
use crate::errors::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Row store holding tables in process memory
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with rows; used by tests
    pub async fn seed(&self, table: &str, rows: Vec<Row>) {
        self.tables.write().await.insert(table.to_string(), rows);
    }

    /// Number of rows currently in a table
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn get_all_rows(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_row(&self, table: &str, row: Row) -> Result<()> {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    async fn update_row(&self, table: &str, matcher: &RowMatch, row: Row) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(false);
        };
        match rows.iter_mut().find(|r| matcher.matches(r)) {
            Some(existing) => {
                *existing = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_row(&self, table: &str, matcher: &RowMatch) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| !matcher.matches(r));
        Ok(rows.len() != before)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
