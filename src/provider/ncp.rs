//! Naver Cloud Platform maps gateway
//!
//! Implements forward geocoding (map-geocode v2) and reverse geocoding
//! (map-reversegeocode v2). Both endpoints authenticate with the
//! `X-NCP-APIGW-API-KEY-ID` / `X-NCP-APIGW-API-KEY` header pair.

use crate::config::ProvidersConfig;
use crate::error::Result;
use crate::geo::Coordinates;
use crate::provider::{
    http_client, ForwardGeocoder, ProviderError, ProviderResult, ReverseGeocoder,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const KEY_ID_HEADER: &str = "X-NCP-APIGW-API-KEY-ID";
const KEY_HEADER: &str = "X-NCP-APIGW-API-KEY";
const GEOCODE_PATH: &str = "/map-geocode/v2/geocode";
const REVERSE_PATH: &str = "/map-reversegeocode/v2/gc";

/// Maps gateway client
#[derive(Debug, Clone)]
pub struct NcpMapsClient {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key: String,
}

/// Geocode response
///
/// Example: `{"status": "OK", "addresses": [{"x": "127.0061042", "y": "37.2731321"}]}`
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    addresses: Vec<GeocodeAddress>,
    #[serde(default, rename = "errorMessage")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeAddress {
    x: String,
    y: String,
}

/// Reverse geocode response
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    status: ReverseStatus,
    #[serde(default)]
    results: Vec<ReverseResult>,
}

#[derive(Debug, Deserialize)]
struct ReverseStatus {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResult {
    region: Region,
}

#[derive(Debug, Deserialize)]
struct Region {
    area1: Option<Area>,
    area2: Option<Area>,
    area3: Option<Area>,
}

#[derive(Debug, Deserialize)]
struct Area {
    #[serde(default)]
    name: String,
}

impl NcpMapsClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.maps_url.trim_end_matches('/').to_string(),
            key_id: config.ncp_client_id.clone(),
            key: config.ncp_client_secret.clone(),
        })
    }

    fn ensure_credentials(&self) -> ProviderResult<()> {
        if self.key_id.is_empty() || self.key.is_empty() {
            return Err(ProviderError::MissingCredentials("maps"));
        }
        Ok(())
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        self.ensure_credentials()?;

        let response = self
            .client
            .get(url)
            .header(KEY_ID_HEADER, &self.key_id)
            .header(KEY_HEADER, &self.key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    /// Parse a coordinate string from the gateway
    fn parse_coord(value: &str, field: &str) -> ProviderResult<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProviderError::Parse(format!("{}: {:?}", field, value)))
    }
}

#[async_trait]
impl ForwardGeocoder for NcpMapsClient {
    async fn geocode(&self, address: &str) -> ProviderResult<Coordinates> {
        let url = format!(
            "{}{}?query={}",
            self.base_url,
            GEOCODE_PATH,
            urlencoding::encode(address)
        );

        let body: GeocodeResponse = self.get(&url).await?;

        if body.status != "OK" {
            return Err(ProviderError::Rejected(
                body.error_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or(body.status),
            ));
        }

        let first = body.addresses.into_iter().next().ok_or(ProviderError::NoMatch)?;
        let lon = Self::parse_coord(&first.x, "x")?;
        let lat = Self::parse_coord(&first.y, "y")?;

        debug!(address, lat, lon, "Geocoded address");
        Ok(Coordinates::new(lat, lon))
    }
}

#[async_trait]
impl ReverseGeocoder for NcpMapsClient {
    async fn locality(&self, point: Coordinates) -> ProviderResult<String> {
        let url = format!(
            "{}{}?coords={},{}&output=json&orders=legalcode",
            self.base_url, REVERSE_PATH, point.lon, point.lat
        );

        let body: ReverseResponse = self.get(&url).await?;

        if body.status.code != 0 {
            return Err(ProviderError::Rejected(format!(
                "code {}: {}",
                body.status.code, body.status.message
            )));
        }

        let region = body
            .results
            .into_iter()
            .next()
            .map(|r| r.region)
            .ok_or(ProviderError::NoMatch)?;

        let names = [region.area1, region.area2, region.area3]
            .into_iter()
            .map(|area| area.map(|a| a.name).filter(|n| !n.is_empty()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ProviderError::Parse("missing region fields".to_string()))?;

        Ok(names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client(server: &MockServer) -> NcpMapsClient {
        let config = ProvidersConfig {
            maps_url: server.base_url(),
            ncp_client_id: "test-id".to_string(),
            ncp_client_secret: "test-key".to_string(),
            ..ProvidersConfig::default()
        };
        NcpMapsClient::new(&config).unwrap()
    }

    #[test]
    fn test_parse_coord() {
        assert_eq!(NcpMapsClient::parse_coord("127.0061042", "x").unwrap(), 127.0061042);
        assert!(NcpMapsClient::parse_coord("abc", "x").is_err());
        assert!(NcpMapsClient::parse_coord("NaN", "x").is_err());
    }

    #[tokio::test]
    async fn test_geocode_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(GEOCODE_PATH)
                    .query_param("query", "경기도 수원시 팔달구 고등동 67번지 14호")
                    .header("x-ncp-apigw-api-key-id", "test-id")
                    .header("x-ncp-apigw-api-key", "test-key");
                then.status(200).json_body(serde_json::json!({
                    "status": "OK",
                    "meta": {"totalCount": 1},
                    "addresses": [{"x": "127.0061042", "y": "37.2731321"}],
                    "errorMessage": ""
                }));
            })
            .await;

        let coords = test_client(&server)
            .geocode("경기도 수원시 팔달구 고등동 67번지 14호")
            .await
            .unwrap();

        assert_eq!(coords.lon, 127.0061042);
        assert_eq!(coords.lat, 37.2731321);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_geocode_no_match() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(200)
                    .json_body(serde_json::json!({"status": "OK", "addresses": []}));
            })
            .await;

        let result = test_client(&server).geocode("nowhere").await;
        assert_eq!(result, Err(ProviderError::NoMatch));
    }

    #[tokio::test]
    async fn test_geocode_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(401).body("Unauthorized");
            })
            .await;

        let result = test_client(&server).geocode("somewhere").await;
        assert_eq!(result, Err(ProviderError::Status(401)));
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(GEOCODE_PATH);
                then.status(200);
            })
            .await;

        let config = ProvidersConfig {
            maps_url: server.base_url(),
            ..ProvidersConfig::default()
        };
        let client = NcpMapsClient::new(&config).unwrap();

        let result = client.geocode("somewhere").await;
        assert_eq!(result, Err(ProviderError::MissingCredentials("maps")));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_reverse_geocode_joins_regions() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(REVERSE_PATH)
                    .query_param("coords", "127.02761,37.498095");
                then.status(200).json_body(serde_json::json!({
                    "status": {"code": 0, "name": "ok", "message": "done"},
                    "results": [{
                        "name": "legalcode",
                        "region": {
                            "area0": {"name": "kr"},
                            "area1": {"name": "서울특별시"},
                            "area2": {"name": "강남구"},
                            "area3": {"name": "역삼동"}
                        }
                    }]
                }));
            })
            .await;

        let locality = test_client(&server)
            .locality(Coordinates::new(37.498095, 127.027610))
            .await
            .unwrap();

        assert_eq!(locality, "서울특별시 강남구 역삼동");
    }

    #[tokio::test]
    async fn test_reverse_geocode_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(REVERSE_PATH);
                then.status(200).json_body(serde_json::json!({
                    "status": {"code": 3, "name": "no results", "message": "no results"},
                    "results": []
                }));
            })
            .await;

        let result = test_client(&server)
            .locality(Coordinates::new(0.0, 0.0))
            .await;
        assert!(matches!(result, Err(ProviderError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_reverse_geocode_missing_region() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(REVERSE_PATH);
                then.status(200).json_body(serde_json::json!({
                    "status": {"code": 0, "message": "done"},
                    "results": [{"region": {"area1": {"name": "서울특별시"}, "area2": {"name": ""}}}]
                }));
            })
            .await;

        let result = test_client(&server)
            .locality(Coordinates::new(37.5, 127.0))
            .await;
        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }

    #[tokio::test]
    async fn test_reverse_geocode_malformed_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(REVERSE_PATH);
                then.status(200).body("not json");
            })
            .await;

        let result = test_client(&server)
            .locality(Coordinates::new(37.5, 127.0))
            .await;
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }
}
