//! API key wrapper for sensitive credential strings
//!
//! Keys are identified by their literal value (equality and hashing go
//! through the raw string) so the key pool can track membership, but the
//! value itself never appears in Debug/Display output or logs. Log lines
//! carry `fingerprint()` instead.

use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::Zeroize;

/// An opaque API key - redacted in Debug/Display/logs, zeroized on drop.
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new key from its literal value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the raw key value (use sparingly - request building only)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short identifier for log lines: an ellipsis plus the last 4 characters.
    pub fn fingerprint(&self) -> String {
        let tail_start = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("…{}", &self.0[tail_start..])
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ApiKey {}

impl Hash for ApiKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
