//! Common types for the YouTube collector workspace

mod error;
mod key;

pub use error::{Error, Result};
pub use key::ApiKey;
