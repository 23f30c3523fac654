//! Wire-level error type for Data API calls

use thiserror::Error;

/// A failed Data API call, before classification.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure: connect, timeout, body I/O.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status with Google's error envelope parsed out.
    /// `reasons` holds the machine-readable reason strings from the
    /// envelope's `errors` list (empty if the body was unparseable).
    #[error("API error {status}: {message} (reasons: {reasons:?})")]
    Api {
        status: u16,
        reasons: Vec<String>,
        message: String,
    },

    /// A success response whose body did not match the expected shape.
    #[error("response decode error: {message}")]
    Decode { message: String },
}

impl ApiError {
    /// Shorthand used by tests and the classifier battery.
    pub fn api(status: u16, reasons: &[&str], message: &str) -> Self {
        ApiError::Api {
            status,
            reasons: reasons.iter().map(|r| r.to_string()).collect(),
            message: message.to_string(),
        }
    }
}
