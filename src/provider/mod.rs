//! External provider clients
//!
//! This module defines the traits the rest of the crate uses to reach the
//! outside world, and the Naver implementations of them:
//! - [`ForwardGeocoder`]: address text to coordinates
//! - [`ReverseGeocoder`]: coordinates to a locality descriptor
//! - [`PlaceSearch`]: free-text keyword search for places
//!
//! Every call is attempted exactly once. Failures come back as a typed
//! [`ProviderError`] and each caller decides whether the failure is fatal.

pub mod markup;
pub mod ncp;
pub mod search;

use crate::geo::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single external call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Credentials for the provider are not configured
    #[error("{0} credentials are not configured")]
    MissingCredentials(&'static str),

    /// Network error or timeout
    #[error("request failed: {0}")]
    Unavailable(String),

    /// Non-success HTTP status
    #[error("provider returned status {0}")]
    Status(u16),

    /// Body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Provider answered but reported an error
    #[error("provider rejected request: {0}")]
    Rejected(String),

    /// Provider answered successfully with no result
    #[error("no match for query")]
    NoMatch,

    /// Response decoded but a field could not be interpreted
    #[error("invalid field in response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Status(status.as_u16())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

/// Result of a single external call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// A raw place returned by the keyword search provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    /// Display name, may contain `<b>` markup
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub road_address: String,
    /// Longitude scaled by 1e7
    #[serde(default, deserialize_with = "string_or_number")]
    pub mapx: String,
    /// Latitude scaled by 1e7
    #[serde(default, deserialize_with = "string_or_number")]
    pub mapy: String,
}

/// Accept map coordinates sent either as JSON strings or numbers
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Address text to coordinates
#[async_trait]
pub trait ForwardGeocoder: Send + Sync {
    /// Geocode an address, returning its best match
    async fn geocode(&self, address: &str) -> ProviderResult<Coordinates>;
}

/// Coordinates to a locality descriptor
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve a point to "area1 area2 area3" (e.g. "서울특별시 강남구 역삼동")
    async fn locality(&self, point: Coordinates) -> ProviderResult<String>;
}

/// Free-text place search
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Search places matching `query`
    async fn search(&self, query: &str) -> ProviderResult<Vec<SearchItem>>;
}

/// Build the HTTP client shared by provider implementations
///
/// The same timeout bounds connecting and the whole request.
pub fn http_client(timeout_secs: u64) -> crate::error::Result<reqwest::Client> {
    let timeout = Duration::from_secs(timeout_secs);
    let client = reqwest::Client::builder()
        .user_agent(concat!("retail-siting/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?;
    Ok(client)
}
