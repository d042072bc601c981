//! Zip code lookup by city.
//!
//! The pipeline only sees the `ZipLookup` trait; `ZipcodebaseClient` is the
//! production implementation backed by the Zipcodebase HTTP API.

use reqwest::StatusCode;

pub mod zipcodebase;

pub use zipcodebase::{ZipcodebaseClient, extract_zip};

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("zip lookup API key is missing (set ZIPCODEBASE_API_KEY)")]
    MissingApiKey,

    #[error("zip lookup rejected credentials with status {0}; check the API key and its remaining quota")]
    Unauthorized(StatusCode),

    #[error("zip lookup failed with status {0}")]
    Status(StatusCode),

    #[error("zip lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("zip lookup returned an unreadable response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Authentication-class failure (bad key, exhausted quota, missing key).
    pub fn is_auth(&self) -> bool {
        matches!(self, LookupError::MissingApiKey | LookupError::Unauthorized(_))
    }
}

/// City + country to postal code.
///
/// `Ok(None)` means the service answered but had no code for the city.
pub trait ZipLookup {
    fn zip_for_city(&self, city: &str, country: &str) -> Result<Option<String>, LookupError>;
}
