//! Database connectors shared by the services in this workspace.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client construction, connection verification
//!   and health checks
//! - `config` - `core_config::FromEnv` support for the connection settings
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "search");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{Backoff, RetryConfig, retry, retry_with_backoff};
