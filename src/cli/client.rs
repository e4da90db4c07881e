use std::time::Duration;

use anyhow::Context;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::store::models::{JournalEntry, JournalEntrySummary};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error response from the Journal API
#[derive(Debug, thiserror::Error)]
#[error("server responded {status}: {message}")]
pub struct ApiFailure {
    pub status: u16,
    pub message: String,
}

/// HTTP client for a running Journal API server
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(server: &str, token: Option<String>) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(server).with_context(|| format!("invalid server URL '{}'", server))?;
        // Keep a base path such as `/journal`: join replaces the last segment otherwise
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let token = token.filter(|t| !t.trim().is_empty());
        Ok(Self { http, base_url, token })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid path '{}'", path))
    }

    fn authorized(&self, builder: RequestBuilder) -> anyhow::Result<RequestBuilder> {
        let token = self
            .token
            .as_deref()
            .context("no bearer token; pass --token or set JOURNAL_TOKEN")?;
        Ok(builder.bearer_auth(token))
    }

    /// POST /entries
    pub async fn create_entry(&self, content: &str) -> anyhow::Result<JournalEntry> {
        let request = self.authorized(self.http.post(self.url("entries")?))?;
        let response = request.json(&json!({ "content": content })).send().await?;
        decode(response).await
    }

    /// GET /entries
    pub async fn list_entries(&self) -> anyhow::Result<Vec<JournalEntrySummary>> {
        let request = self.authorized(self.http.get(self.url("entries")?))?;
        let response = request.send().await?;
        decode(response).await
    }

    /// GET /health
    pub async fn health(&self) -> anyhow::Result<Value> {
        let response = self.http.get(self.url("health")?).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(ApiFailure {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    serde_json::from_str(&body).context("unexpected response body")
}
