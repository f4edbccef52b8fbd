//! Naver local search adapter.
//!
//! Calls `GET {base_url}/v1/search/local.json` with client id/secret headers
//! and maps the items into [`Place`]s. Names arrive with `<b>` highlight
//! markup, which is stripped.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::conversation::place::{strip_html_tags, MAX_PLACE_CANDIDATES};
use crate::domain::conversation::{GeoPoint, Place};
use crate::ports::{PlaceSearch, SearchError};

/// Configuration for the Naver local search adapter.
#[derive(Debug, Clone)]
pub struct NaverSearchConfig {
    client_id: String,
    client_secret: Secret<String>,
    pub base_url: String,
    pub display: usize,
    pub timeout: Duration,
}

impl NaverSearchConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            base_url: "https://openapi.naver.com".to_string(),
            display: MAX_PLACE_CANDIDATES,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Result count, capped at the candidate limit.
    pub fn with_display(mut self, display: usize) -> Self {
        self.display = display.clamp(1, MAX_PLACE_CANDIDATES);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.expose_secret().is_empty()
    }
}

/// Naver local search client.
pub struct NaverPlaceSearch {
    config: NaverSearchConfig,
    client: Client,
}

impl NaverPlaceSearch {
    pub fn new(config: NaverSearchConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn search_url(&self) -> String {
        format!("{}/v1/search/local.json", self.config.base_url)
    }

    fn query_params(&self, query: &str, location: Option<GeoPoint>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", query.to_string()),
            ("display", self.config.display.to_string()),
            (
                "sort",
                if location.is_some() { "distance" } else { "random" }.to_string(),
            ),
        ];
        if let Some(point) = location {
            params.push(("lat", point.lat.to_string()));
            params.push(("lng", point.lng.to_string()));
        }
        params
    }
}

#[async_trait]
impl PlaceSearch for NaverPlaceSearch {
    async fn search(
        &self,
        query: &str,
        location: Option<GeoPoint>,
    ) -> Result<Vec<Place>, SearchError> {
        if !self.config.is_configured() {
            return Err(SearchError::NotConfigured);
        }

        let response = self
            .client
            .get(self.search_url())
            .header("X-Naver-Client-Id", &self.config.client_id)
            .header(
                "X-Naver-Client-Secret",
                self.config.client_secret.expose_secret(),
            )
            .query(&self.query_params(query, location))
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body: NaverLocalResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        let places: Vec<Place> = body
            .items
            .into_iter()
            .take(self.config.display)
            .map(NaverLocalItem::into_place)
            .collect();

        tracing::debug!(query, count = places.len(), "Naver local search completed");
        Ok(places)
    }
}

// ----- Naver API Types -----

#[derive(Debug, Deserialize)]
struct NaverLocalResponse {
    #[serde(default)]
    items: Vec<NaverLocalItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NaverLocalItem {
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    telephone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    road_address: String,
    #[serde(default)]
    mapx: String,
    #[serde(default)]
    mapy: String,
}

impl NaverLocalItem {
    fn into_place(self) -> Place {
        let location = match (parse_coordinate(&self.mapy), parse_coordinate(&self.mapx)) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        Place {
            name: strip_html_tags(&self.title),
            telephone: non_empty(self.telephone),
            address: self.address,
            road_address: non_empty(self.road_address),
            category: self.category,
            location,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Coordinates come as integer degrees scaled by 10^7 (e.g. "1270276096").
fn parse_coordinate(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if value == 0.0 {
        return None;
    }
    Some(if value.abs() > 180.0 { value / 10_000_000.0 } else { value })
}
