//! DataSetIQ HTTP client.
//!
//! Every request is bounded by the configured timeout, so a hung server ends
//! in `ApiError::Network` rather than a session stuck in `loading`.

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::models::{Observation, Profile, SearchResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

/// Remote catalog operations used by the session
#[async_trait]
pub trait SeriesApi: Send + Sync {
    /// Fetch the account profile for `key`
    async fn fetch_profile(&self, key: &str) -> Result<Profile, ApiError>;

    /// Search the series catalog; `key` is optional for anonymous search
    async fn search_series(&self, key: Option<&str>, query: &str) -> Result<Vec<SearchResult>, ApiError>;

    /// Fetch the observations of one series
    async fn fetch_observations(&self, key: Option<&str>, series_id: &str) -> Result<Vec<Observation>, ApiError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchBody {
    List(Vec<SearchResult>),
    Wrapped { results: Vec<SearchResult> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObservationBody {
    List(Vec<Observation>),
    Wrapped { data: Vec<Observation> },
}

#[derive(Clone)]
pub struct HttpSeriesClient {
    client: Client,
    base_url: String,
}

impl HttpSeriesClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(format!("datasetiq-bridge/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(request: RequestBuilder, key: Option<&str>) -> RequestBuilder {
        match key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message_from_body(&body)
            .unwrap_or_else(|| format!("Request failed ({})", status));
        tracing::warn!("DataSetIQ API returned {}: {}", status, message);
        Err(ApiError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SeriesApi for HttpSeriesClient {
    async fn fetch_profile(&self, key: &str) -> Result<Profile, ApiError> {
        let request = Self::authorized(self.client.get(self.url("/api/public/me")), Some(key));
        let response = self.send(request).await?;
        let profile = response
            .json::<Profile>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        tracing::debug!("Fetched profile for {} ({})", profile.email, profile.plan);
        Ok(profile)
    }

    async fn search_series(&self, key: Option<&str>, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let request = self
            .client
            .get(self.url("/api/public/search"))
            .query(&[("q", query.trim())]);
        let response = self.send(Self::authorized(request, key)).await?;
        let body = response
            .json::<SearchBody>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        let results = match body {
            SearchBody::List(results) | SearchBody::Wrapped { results } => results,
        };
        tracing::debug!("Search {:?} returned {} results", query, results.len());
        Ok(results)
    }

    async fn fetch_observations(&self, key: Option<&str>, series_id: &str) -> Result<Vec<Observation>, ApiError> {
        let request = self
            .client
            .get(self.url("/api/public/series/data"))
            .query(&[("id", series_id)]);
        let response = self.send(Self::authorized(request, key)).await?;
        let body = response
            .json::<ObservationBody>()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        Ok(match body {
            ObservationBody::List(data) | ObservationBody::Wrapped { data } => data,
        })
    }
}

/// Pull a human-readable message out of an error body:
/// `{"error": "..."}`, `{"error": {"message": "..."}}` or `{"message": "..."}`.
fn error_message_from_body(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = json
        .get("error")
        .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(|m| m.as_str())))
        .or_else(|| json.get("message").and_then(|m| m.as_str()))?;
    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
