//! Address autocomplete and reverse geocoding against a LocationIQ-compatible provider.

use reqwest::{StatusCode, Url};
use std::{future::Future, sync::Arc};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::Config,
    models::{LocationSuggestion, ReverseResult},
    shared::geo::Coordinate,
};

mod debounce;
pub use debounce::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geocoding failed with HTTP {0}")]
    Status(StatusCode),
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

pub trait SuggestionSource: Send + Sync + 'static {
    fn suggest(
        &self,
        query: String,
    ) -> impl Future<Output = Result<Vec<LocationSuggestion>, Error>> + Send;
}

#[derive(Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    key: Arc<str>,
    limit: usize,
    min_query_len: usize,
}

impl GeocodeClient {
    pub fn new(config: &Config) -> Result<Self, self::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.geocoder_url.trim_end_matches('/').into(),
            key: config.geocoder_key.as_str().into(),
            limit: config.suggestion_limit,
            min_query_len: config.min_query_len,
        })
    }

    /// Suggestions for a partial address. Short queries return nothing without a lookup.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<LocationSuggestion>, self::Error> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            return Ok(Vec::new());
        }
        let url = self.url(
            "/autocomplete",
            &[
                ("q", query.to_string()),
                ("key", self.key.to_string()),
                ("limit", self.limit.to_string()),
            ],
        )?;
        // The provider answers 404 when nothing matches.
        let suggestions: Vec<LocationSuggestion> = self.get(url).await?.unwrap_or_default();
        debug!("{} suggestions for `{query}`", suggestions.len());
        Ok(suggestions)
    }

    pub async fn reverse(&self, at: Coordinate) -> Result<String, self::Error> {
        let url = self.url(
            "/reverse",
            &[
                ("lat", at.latitude.to_string()),
                ("lon", at.longitude.to_string()),
                ("key", self.key.to_string()),
                ("format", "json".to_string()),
            ],
        )?;
        let result: Option<ReverseResult> = self.get(url).await?;
        result
            .map(|result| result.display_name)
            .ok_or(Error::Status(StatusCode::NOT_FOUND))
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, self::Error> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse_with_params(&raw, params).map_err(|err| Error::InvalidUrl(format!("{raw}: {err}")))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, self::Error> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        let body = response.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

impl SuggestionSource for GeocodeClient {
    async fn suggest(&self, query: String) -> Result<Vec<LocationSuggestion>, self::Error> {
        self.autocomplete(&query).await
    }
}
