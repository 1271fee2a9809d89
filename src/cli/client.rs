use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::cli::config;

/// HTTP client bound to the currently selected server, carrying the
/// saved bearer token when one exists.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

/// Parsed response: status plus the decoded JSON body (Null when the
/// server sent no body, e.g. 204).
pub struct ApiOutcome {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `data` member of a success envelope, or the whole body.
    pub fn data(&self) -> &Value {
        match self.body.get("data") {
            Some(data) => data,
            None => &self.body,
        }
    }

    /// The `meta` member of a success envelope, if present.
    pub fn meta(&self) -> Option<&Value> {
        self.body.get("meta")
    }

    /// Human-readable error from the error envelope.
    pub fn error_message(&self) -> String {
        let message = self
            .body
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed");
        match self.body.get("code").and_then(|v| v.as_str()) {
            Some(code) => format!("{} ({}, HTTP {})", message, code, self.status.as_u16()),
            None => format!("{} (HTTP {})", message, self.status.as_u16()),
        }
    }
}

impl ApiClient {
    /// Client for the current server, with its saved token if any.
    pub fn from_current() -> anyhow::Result<Self> {
        let (_, entry) = config::current_server()?;
        let token = config::current_session()?.map(|s| s.access_token);
        Self::new(entry.url, token)
    }

    /// Client for the current server, failing when not logged in.
    pub fn authenticated() -> anyhow::Result<Self> {
        let (name, entry) = config::current_server()?;
        let session = config::current_session()?.ok_or_else(|| {
            anyhow::anyhow!("Not logged in to '{}'. Run `orchard auth login` first", name)
        })?;
        Self::new(entry.url, Some(session.access_token))
    }

    pub fn new(base_url: String, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<ApiOutcome> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> anyhow::Result<ApiOutcome> {
        self.request(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Option<Value>) -> anyhow::Result<ApiOutcome> {
        self.request(Method::PUT, path, body).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<ApiOutcome> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<ApiOutcome> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, &url);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Could not reach {}: {}", url, e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiOutcome { status, body })
    }
}
