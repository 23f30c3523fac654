//! YouTube Data API v3 client with quota-aware key rotation
//!
//! Thin wire layer over the handful of Data API operations the collector
//! uses (video lookup, related search, channel video listing, channel
//! lookup). Every call runs through the `quota-pool` executor: the key is
//! injected per attempt as the `key` query parameter, quota-exhausted
//! keys are rotated away, transient failures retry with backoff. Callers
//! see domain records, never retries or keys.

pub mod client;
pub mod error;
pub mod models;
pub mod quota;
pub mod transport;

pub use client::Client;
pub use error::ApiError;
pub use transport::{DEFAULT_BASE_URL, Transport};
