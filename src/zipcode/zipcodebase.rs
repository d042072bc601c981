//! Zipcodebase API integration (`/code/city`).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;

use super::{LookupError, ZipLookup};

const BASE_URL: &str = "https://app.zipcodebase.com/api/v1/code/city";
const API_KEY_VAR: &str = "ZIPCODEBASE_API_KEY";

pub struct ZipcodebaseClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ZipcodebaseClient {
    /// Build a client with the API key from the environment (`.env` honored).
    ///
    /// A missing key is not an error here: every lookup then fails with
    /// `LookupError::MissingApiKey` and the run carries on.
    pub fn from_env(timeout: Duration) -> Result<Self, LookupError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty());
        Self::new(api_key, timeout)
    }

    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at another `/code/city` endpoint (mirrors, local servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl ZipLookup for ZipcodebaseClient {
    fn zip_for_city(&self, city: &str, country: &str) -> Result<Option<String>, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;

        let resp = self
            .client
            .get(&self.base_url)
            .header("apikey", api_key)
            .query(&[("apikey", api_key), ("city", city), ("country", country)])
            .send()?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LookupError::Unauthorized(status));
        }
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body: Value = resp.json().map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(extract_zip(&body))
    }
}

/// Pull the first postal code out of a `/code/city` response body.
///
/// The service has answered in two shapes:
///
/// - `{"results": ["45202", ...]}`
/// - `{"results": {"Cincinnati": [{"postal_code": "45202", ...}, ...]}}`
///   (older responses use `zip_code` instead of `postal_code`)
pub fn extract_zip(body: &Value) -> Option<String> {
    match body.get("results")? {
        Value::Array(codes) => codes.first().and_then(scalar_to_string),
        Value::Object(by_city) => {
            let (_, entries) = by_city.iter().next()?;
            let first = entries.as_array()?.first()?;
            first
                .get("postal_code")
                .and_then(scalar_to_string)
                .or_else(|| first.get("zip_code").and_then(scalar_to_string))
        }
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
