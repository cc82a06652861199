//! HTTP client for API-level setup and verification
//!
//! Tests use this to seed or check backend state around UI flows.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{HarnessError, HarnessResult};

pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> HarnessResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HarnessError::Config(format!("bad header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| HarnessError::Config(format!("bad header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Bearer token sent with every subsequent request
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    pub fn clear_auth_token(&mut self) {
        self.auth_token = None;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> HarnessResult<(StatusCode, Value)> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> HarnessResult<(StatusCode, Value)> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> HarnessResult<(StatusCode, Value)> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> HarnessResult<(StatusCode, Value)> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> HarnessResult<(StatusCode, Value)> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> HarnessResult<(StatusCode, Value)> {
        let url = self.url(path);
        debug!(%method, url, "api request");

        let mut builder = self.client.request(method, &url);
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response: Response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(status = %status, "api response");
        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_urls_without_doubled_slashes() {
        let config = ApiConfig {
            base_url: "https://api.example.com/".to_string(),
            ..ApiConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/users/1"), "https://api.example.com/users/1");
        assert_eq!(client.url("users/1"), "https://api.example.com/users/1");
    }

    #[test]
    fn rejects_malformed_default_headers() {
        let mut config = ApiConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(ApiClient::new(&config).is_err());
    }
}
