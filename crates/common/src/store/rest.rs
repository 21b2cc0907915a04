//! REST row store
//!
//! Talks JSON to a sheets bridge that fronts the actual spreadsheet.
//! Failures surface immediately as storage errors; the bridge applies its
//! own timeout policy and the core adds no retries.

use super::{Row, RowMatch, RowStore};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Row store backed by an HTTP sheets bridge
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct RowsResponse {
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct AppendRequest<'a> {
    row: &'a Row,
}

#[derive(Serialize)]
struct MatchBody<'a> {
    column: usize,
    value: &'a str,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "match")]
    matcher: MatchBody<'a>,
    row: &'a Row,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    #[serde(rename = "match")]
    matcher: MatchBody<'a>,
}

#[derive(Deserialize)]
struct MatchedResponse {
    matched: bool,
}

impl RestStore {
    /// Create a new REST store for the given bridge URL
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn table_url(&self, table: &str, suffix: &str) -> String {
        format!("{}/tables/{}/{}", self.base_url, table, suffix)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage {
                message: format!("Bridge error {}: {}", status, body),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RowStore for RestStore {
    async fn get_all_rows(&self, table: &str) -> Result<Vec<Row>> {
        let response = self
            .client
            .get(self.table_url(table, "rows"))
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Request failed: {}", e),
            })?;

        let result: RowsResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(result.rows)
    }

    async fn append_row(&self, table: &str, row: Row) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table, "append"))
            .json(&AppendRequest { row: &row })
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Request failed: {}", e),
            })?;

        Self::check(response).await?;
        Ok(())
    }

    async fn update_row(&self, table: &str, matcher: &RowMatch, row: Row) -> Result<bool> {
        let response = self
            .client
            .post(self.table_url(table, "update"))
            .json(&UpdateRequest {
                matcher: MatchBody {
                    column: matcher.column,
                    value: &matcher.value,
                },
                row: &row,
            })
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Request failed: {}", e),
            })?;

        let result: MatchedResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(result.matched)
    }

    async fn delete_row(&self, table: &str, matcher: &RowMatch) -> Result<bool> {
        let response = self
            .client
            .post(self.table_url(table, "delete"))
            .json(&DeleteRequest {
                matcher: MatchBody {
                    column: matcher.column,
                    value: &matcher.value,
                },
            })
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Request failed: {}", e),
            })?;

        let result: MatchedResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Failed to parse response: {}", e),
            })?;

        Ok(result.matched)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| AppError::Storage {
                message: format!("Ping failed: {}", e),
            })?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_normalizes_trailing_slash() {
        let store = RestStore::new("http://bridge.local/".to_string(), 10);
        assert_eq!(
            store.table_url("Database", "rows"),
            "http://bridge.local/tables/Database/rows"
        );
    }
}
