//! Authentication against the credential tables
//!
//! Provides:
//! - Access key hashing and comparison
//! - Expiring auth token issue and validation
//! - The expired-token sweep run by the scheduled task
//!
//! Authentication failure is an outcome value, never an error: the router
//! turns it into the distinguished unauthorized marker.

use crate::errors::Result;
use crate::store::{tables, RowMatch, RowStore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

// Keys table layout: email, key hash
const KEY_COL_EMAIL: usize = 0;
const KEY_COL_HASH: usize = 1;

// AuthTokens table layout: email, token, expiry
const TOKEN_COL_EMAIL: usize = 0;
const TOKEN_COL_TOKEN: usize = 1;
const TOKEN_COL_EXPIRES: usize = 2;

/// Credentials supplied with a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub key: Option<String>,
    #[serde(rename = "authToken")]
    pub auth_token: Option<String>,
}

/// Result of an authentication check
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthOutcome {
    fn denied() -> Self {
        Self::default()
    }
}

/// Hash an access key for storage
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate an access key against a stored hash
pub fn validate_key(key: &str, stored_hash: &str) -> bool {
    hash_key(key) == stored_hash
}

/// Generate a new auth token
pub fn generate_token() -> String {
    let random_bytes: [u8; 32] = rand::random();
    hex::encode(random_bytes)
}

/// Credential checker backed by the row store
pub struct Authenticator {
    store: Arc<dyn RowStore>,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(store: Arc<dyn RowStore>, token_ttl_minutes: i64) -> Self {
        Self {
            store,
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    /// Check the supplied credentials.
    ///
    /// A valid auth token authenticates directly; otherwise a valid
    /// email+key pair authenticates and is answered with a fresh token.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome> {
        let Some(email) = credentials.email.as_deref() else {
            crate::metrics::record_auth(false);
            return Ok(AuthOutcome::denied());
        };

        let outcome = if let Some(token) = credentials.auth_token.as_deref() {
            self.check_token(email, token).await?
        } else if let Some(key) = credentials.key.as_deref() {
            self.check_key(email, key).await?
        } else {
            AuthOutcome::denied()
        };

        crate::metrics::record_auth(outcome.authenticated);
        Ok(outcome)
    }

    async fn check_token(&self, email: &str, token: &str) -> Result<AuthOutcome> {
        let rows = self.store.get_all_rows(tables::AUTH_TOKENS).await?;

        let valid = rows.iter().any(|row| {
            row.get(TOKEN_COL_EMAIL).map(String::as_str) == Some(email)
                && row.get(TOKEN_COL_TOKEN).map(String::as_str) == Some(token)
                && row
                    .get(TOKEN_COL_EXPIRES)
                    .and_then(|e| DateTime::parse_from_rfc3339(e).ok())
                    .is_some_and(|expires| expires > Utc::now())
        });

        if !valid {
            return Ok(AuthOutcome::denied());
        }

        Ok(AuthOutcome {
            authenticated: true,
            email: Some(email.to_string()),
            token: Some(token.to_string()),
            expires_at: None,
        })
    }

    async fn check_key(&self, email: &str, key: &str) -> Result<AuthOutcome> {
        let rows = self.store.get_all_rows(tables::KEYS).await?;

        let valid = rows.iter().any(|row| {
            row.get(KEY_COL_EMAIL).map(String::as_str) == Some(email)
                && row
                    .get(KEY_COL_HASH)
                    .is_some_and(|hash| validate_key(key, hash))
        });

        if !valid {
            return Ok(AuthOutcome::denied());
        }

        let (token, expires_at) = self.issue_token(email).await?;

        Ok(AuthOutcome {
            authenticated: true,
            email: Some(email.to_string()),
            token: Some(token),
            expires_at: Some(expires_at),
        })
    }

    /// Issue a fresh expiring token for an authenticated email
    pub async fn issue_token(&self, email: &str) -> Result<(String, DateTime<Utc>)> {
        let token = generate_token();
        let expires_at = Utc::now() + self.token_ttl;

        self.store
            .append_row(
                tables::AUTH_TOKENS,
                vec![email.to_string(), token.clone(), expires_at.to_rfc3339()],
            )
            .await?;

        Ok((token, expires_at))
    }

    /// Remove expired token rows; the body of the periodic cleanup task
    pub async fn purge_expired_tokens(&self) -> Result<usize> {
        let rows = self.store.get_all_rows(tables::AUTH_TOKENS).await?;
        let now = Utc::now();
        let mut purged = 0;

        for row in rows {
            let expired = row
                .get(TOKEN_COL_EXPIRES)
                .and_then(|e| DateTime::parse_from_rfc3339(e).ok())
                .map_or(true, |expires| expires <= now);

            if !expired {
                continue;
            }

            if let Some(token) = row.get(TOKEN_COL_TOKEN) {
                if self
                    .store
                    .delete_row(
                        tables::AUTH_TOKENS,
                        &RowMatch::new(TOKEN_COL_TOKEN, token.clone()),
                    )
                    .await?
                {
                    purged += 1;
                }
            }
        }

        if purged > 0 {
            tracing::info!(purged, "Expired auth tokens removed");
            crate::metrics::record_tokens_purged(purged);
        }

        Ok(purged)
    }
}
