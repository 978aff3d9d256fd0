//! MongoDB connector and utilities
//!
//! A single [`Client`] is built at startup and shared; it owns the
//! connection pool configured through [`MongoConfig`].

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{MongoError, client_options, connect_from_config, connect_from_config_with_retry};
pub use health::{HealthStatus, check_health_detailed};

pub use mongodb::{Client, Collection, Database};
