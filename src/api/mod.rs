//! Typed client for the Poolify REST backend.
//!
//! Every call is a single request with no retries. Non-2xx responses become
//! [`Error::Status`] carrying the message the backend meant for the user.

use reqwest::{
    Method, RequestBuilder, StatusCode, Url,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

mod admin;
mod auth;
mod feedback;
mod rides;

pub use auth::{LoginRequest, SignupRequest};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: StatusCode, message: String },
    #[error("Parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, self::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').into(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(Into::into);
        self
    }

    fn url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, self::Error> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|err| Error::InvalidUrl(format!("{raw}: {err}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, self::Error> {
        let body = self.send(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        payload: &B,
    ) -> Result<String, self::Error> {
        let body = serde_json::to_string(payload)?;
        let builder = self
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(builder).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, self::Error> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            let message = error_message(status, &body);
            warn!("Request failed with {status}: {message}");
            Err(Error::Status { status, message })
        }
    }
}

/// The user-facing message of a failed response: the JSON `message` field when
/// present, then the raw body, then the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.trim().is_empty());
    if let Some(message) = from_json {
        return message;
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("HTTP {}: {reason}", status.as_u16()),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[test]
fn message_from_json_body() {
    let message = error_message(
        StatusCode::CONFLICT,
        r#"{"message":"You already requested this ride"}"#,
    );
    assert_eq!(message, "You already requested this ride");
}

#[test]
fn message_from_raw_body() {
    let message = error_message(StatusCode::BAD_REQUEST, "Ride is full\n");
    assert_eq!(message, "Ride is full");

    let message = error_message(StatusCode::BAD_REQUEST, r#"{"error":"nope"}"#);
    assert_eq!(message, r#"{"error":"nope"}"#);
}

#[test]
fn message_from_status() {
    let message = error_message(StatusCode::NOT_FOUND, "");
    assert_eq!(message, "HTTP 404: Not Found");
}
