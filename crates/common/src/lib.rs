//! Copydesk Common Library
//!
//! Shared code for the Copydesk article-management services including:
//! - Article and editor record models with row (de)serialization
//! - Query filter for structured and free-text searches
//! - Row-store abstraction over the spreadsheet-style backend
//! - Notification sender abstraction
//! - Credential and token authentication
//! - Action layer orchestrating the above
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod ams;
pub mod auth;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod notify;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use ams::{Ams, ApiResponse};
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use store::RowStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
