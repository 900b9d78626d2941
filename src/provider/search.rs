//! Naver local keyword search
//!
//! `GET /v1/search/local.json?query=..&display=..&sort=..` authenticated with
//! `X-Naver-Client-Id` / `X-Naver-Client-Secret`. Items carry map coordinates
//! as integers scaled by 1e7.

use crate::config::ProvidersConfig;
use crate::constants::search::{DISPLAY_SIZE, SORT_ORDER};
use crate::error::Result;
use crate::provider::{http_client, PlaceSearch, ProviderError, ProviderResult, SearchItem};
use async_trait::async_trait;
use serde::Deserialize;

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";
const LOCAL_SEARCH_PATH: &str = "/v1/search/local.json";

/// Local search client
#[derive(Debug, Clone)]
pub struct LocalSearchClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct LocalSearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

impl LocalSearchClient {
    /// Create a client from provider configuration
    pub fn new(config: &ProvidersConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.search_url.trim_end_matches('/').to_string(),
            client_id: config.search_client_id.clone(),
            client_secret: config.search_client_secret.clone(),
        })
    }
}

#[async_trait]
impl PlaceSearch for LocalSearchClient {
    async fn search(&self, query: &str) -> ProviderResult<Vec<SearchItem>> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ProviderError::MissingCredentials("search"));
        }

        let url = format!(
            "{}{}?query={}&display={}&sort={}",
            self.base_url,
            LOCAL_SEARCH_PATH,
            urlencoding::encode(query),
            DISPLAY_SIZE,
            SORT_ORDER
        );

        let response = self
            .client
            .get(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body: LocalSearchResponse = response.json().await?;
        Ok(body.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client(server: &MockServer) -> LocalSearchClient {
        let config = ProvidersConfig {
            search_url: server.base_url(),
            search_client_id: "client".to_string(),
            search_client_secret: "secret".to_string(),
            ..ProvidersConfig::default()
        };
        LocalSearchClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(LOCAL_SEARCH_PATH)
                    .query_param("query", "서울특별시 강남구 역삼동 카페")
                    .query_param("display", "5")
                    .query_param("sort", "random")
                    .header("x-naver-client-id", "client")
                    .header("x-naver-client-secret", "secret");
                then.status(200).json_body(serde_json::json!({
                    "lastBuildDate": "Mon, 19 Oct 2026 12:00:00 +0900",
                    "total": 1,
                    "start": 1,
                    "display": 1,
                    "items": [{
                        "title": "<b>스타벅스</b> 강남역점",
                        "link": "",
                        "category": "카페,디저트>커피전문점",
                        "description": "",
                        "telephone": "",
                        "address": "서울특별시 강남구 역삼동 825",
                        "roadAddress": "서울특별시 강남구 강남대로 396",
                        "mapx": "1270276100",
                        "mapy": "374980950"
                    }]
                }));
            })
            .await;

        let items = test_client(&server)
            .search("서울특별시 강남구 역삼동 카페")
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "<b>스타벅스</b> 강남역점");
        assert_eq!(items[0].mapy, "374980950");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_non_success_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(LOCAL_SEARCH_PATH);
                then.status(429).body("rate limited");
            })
            .await;

        let result = test_client(&server).search("카페").await;
        assert_eq!(result, Err(ProviderError::Status(429)));
    }

    #[tokio::test]
    async fn test_search_missing_credentials() {
        let config = ProvidersConfig {
            search_url: "http://127.0.0.1:9".to_string(),
            ..ProvidersConfig::default()
        };
        let client = LocalSearchClient::new(&config).unwrap();

        let result = client.search("카페").await;
        assert_eq!(result, Err(ProviderError::MissingCredentials("search")));
    }

    #[tokio::test]
    async fn test_search_unreachable() {
        let config = ProvidersConfig {
            search_url: "http://127.0.0.1:9".to_string(),
            search_client_id: "client".to_string(),
            search_client_secret: "secret".to_string(),
            timeout_secs: 1,
            ..ProvidersConfig::default()
        };
        let client = LocalSearchClient::new(&config).unwrap();

        let result = client.search("카페").await;
        assert!(matches!(result, Err(ProviderError::Unavailable(_))));
    }
}
