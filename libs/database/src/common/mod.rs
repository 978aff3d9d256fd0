//! Utilities shared by every connector

pub mod retry;

pub use retry::{Backoff, RetryConfig, retry, retry_with_backoff};
