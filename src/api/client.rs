//! Authenticated JSON client for the platform API

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

/// Connection settings for the platform API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.example.com`
    pub base_url: String,
    /// Bearer token supplied by the embedding application. Every
    /// platform endpoint requires one.
    pub auth_token: Option<String>,
}

/// Platform API client. All endpoints authenticate with the bearer
/// token; a missing token fails before any network traffic.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.config
            .auth_token
            .as_deref()
            .ok_or(ApiError::MissingCredential)
    }

    /// Make an authenticated GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ApiError::Parse)
    }

    /// Make an authenticated POST request
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        data: &T,
    ) -> Result<R, ApiError> {
        let token = self.bearer()?;

        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(data)
            .send()
            .await
            .map_err(ApiError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ApiError::Parse)
    }
}

/// Platform API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("No auth token configured for an authenticated endpoint")]
    MissingCredential,
}
