//! Supabase client: PostgREST for rows, GoTrue for token lookup.
//!
//! One instance is created at startup and shared by every request. The inner
//! `reqwest::Client` pools connections and is safe to use concurrently.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::models::{JournalEntry, JournalEntrySummary, NewJournalEntry, SUMMARY_COLUMNS};
use super::{EntryStore, StoreError};
use crate::auth::{AuthProvider, ProviderError, ProviderUser};
use crate::config::StoreConfig;
use crate::types::UserId;

const REST_PATH: &str = "rest/v1/";
const AUTH_USER_PATH: &str = "auth/v1/user";
const CONNECT_TIMEOUT_SECS: u64 = 5;

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: Url,
    service_key: String,
    table: String,
}

impl SupabaseClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut base_url =
            Url::parse(&config.url).map_err(|e| StoreError::Client(format!("invalid store url: {}", e)))?;
        // Url::join drops the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            service_key: config.service_key.clone(),
            table: config.table.clone(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::Client(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn table_endpoint(&self, table: &str) -> Result<Url, StoreError> {
        self.endpoint(&format!("{}{}", REST_PATH, table))
    }

    /// Request authenticated as the service role
    fn service_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Insert one row into `table` and return the rows the store echoes back
    pub async fn insert_rows<T, R>(&self, table: &str, row: &T) -> Result<Vec<R>, StoreError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.table_endpoint(table)?;
        let response = self
            .service_request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        read_rows(response).await
    }

    /// Select `columns` from rows where `field` equals `value`, ordered by
    /// `order_by` descending
    pub async fn select_eq_desc<R>(
        &self,
        table: &str,
        columns: &str,
        field: &str,
        value: &str,
        order_by: &str,
    ) -> Result<Vec<R>, StoreError>
    where
        R: DeserializeOwned,
    {
        let url = self.table_endpoint(table)?;
        let filter = format!("eq.{}", value);
        let order = format!("{}.desc", order_by);
        let response = self
            .service_request(Method::GET, url)
            .query(&[("select", columns), (field, filter.as_str()), ("order", order.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        read_rows(response).await
    }
}

async fn read_rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, StoreError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl EntryStore for SupabaseClient {
    async fn insert_entry(&self, entry: &NewJournalEntry) -> Result<Vec<JournalEntry>, StoreError> {
        self.insert_rows(&self.table, entry).await
    }

    async fn list_entries(&self, user_id: &UserId) -> Result<Vec<JournalEntrySummary>, StoreError> {
        self.select_eq_desc(&self.table, SUMMARY_COLUMNS, "user_id", user_id.as_str(), "created_at")
            .await
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn get_user(&self, token: &str) -> Result<ProviderUser, ProviderError> {
        let url = self
            .endpoint(AUTH_USER_PATH)
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ProviderUser>()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("unreadable user response: {}", e)));
        }

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::Rejected(status.as_u16()));
        }

        Err(ProviderError::Unavailable(format!(
            "auth provider responded with {}",
            status
        )))
    }
}
