//! HTTP transport for the Data API
//!
//! One shared `reqwest::Client`; every request is a GET with the API key
//! appended as the `key` query parameter. Error statuses are parsed out
//! of Google's error envelope so the classifier can see the
//! machine-readable reason strings.

use std::time::Duration;

use common::ApiKey;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Production endpoint; tests point `base_url` at a local server.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Shared HTTP transport with an injectable base URL.
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
}

/// Google's error envelope:
/// `{"error":{"code":403,"message":"...","errors":[{"reason":"quotaExceeded",...}]}}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Deserialize)]
struct ErrorItem {
    reason: Option<String>,
}

impl Transport {
    pub fn new(timeout: Duration, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// GET `{base_url}/{path}` with `query` plus the key parameter, and
    /// decode the JSON response body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        key: &ApiKey,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{path}", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", key.expose())])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                message: e.to_string(),
            })
        } else {
            Err(parse_error_body(status.as_u16(), &body))
        }
    }
}

/// Parse the error envelope out of a non-success body. Unparseable bodies
/// keep an empty reason list and carry a truncated snippet as the message.
fn parse_error_body(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => ApiError::Api {
            status,
            reasons: envelope
                .error
                .errors
                .into_iter()
                .filter_map(|e| e.reason)
                .collect(),
            message: envelope.error.message,
        },
        Err(_) => ApiError::Api {
            status,
            reasons: Vec::new(),
            message: String::from_utf8_lossy(body).chars().take(200).collect(),
        },
    }
}
