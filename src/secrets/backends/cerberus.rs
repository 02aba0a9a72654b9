//! Cerberus document backend
//!
//! Talks to the Cerberus secret API over HTTPS. Secrets live inside safe
//! deposit boxes (SDBs); each SDB owns a path prefix such as `app/payments/`
//! and every document below it is a flat JSON object of string properties.
//!
//! Endpoints used:
//! - `GET  /v1/secret/{path}?list=true` one level of keys (`sub/` for prefixes)
//! - `GET  /v1/secret/{path}[?versionId=..]` a whole document
//! - `POST /v1/secret/{path}` replace a whole document
//! - `DELETE /v1/secret/{path}` remove a document
//! - `GET  /v2/safe-deposit-box` SDB summaries, used to resolve an SDB name
//!
//! Session acquisition (IAM role chain via STS) happens outside this crate;
//! the client is handed a token and its expiry.

use super::backend::{
    properties_from_json, properties_to_text, DocumentBackendType, DocumentClient, ListEntry,
    PropertyMap,
};
use crate::config::CerberusConfig;
use crate::secrets::error::{Result, StoreError};
use crate::secrets::types::SecretString;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info};
use url::Url;

const TOKEN_HEADER: &str = "X-Cerberus-Token";
const CLIENT_HEADER: &str = "X-Cerberus-Client";
const CLIENT_ID: &str = concat!("cerberus-store/", env!("CARGO_PKG_VERSION"));

/// Authenticated Cerberus session handed over by the auth collaborator.
#[derive(Debug, Clone, Default)]
pub struct CerberusSession {
    token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

impl CerberusSession {
    pub fn new(token: Option<SecretString>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// A session counts as authenticated while it has a token that has not expired.
    pub fn is_authenticated(&self) -> bool {
        let has_token = self.token.as_ref().is_some_and(|t| !t.is_empty());
        let unexpired = self.expires_at.map_or(true, |at| at > Utc::now());
        has_token && unexpired
    }

    fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }
}

#[derive(Debug, Deserialize)]
struct SecretResponse {
    #[serde(default)]
    data: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<ListData>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SdbSummary {
    name: String,
    path: String,
}

/// HTTP client for the Cerberus secret API.
#[derive(Debug, Clone)]
pub struct CerberusClient {
    http: Client,
    base: Url,
    session: CerberusSession,
}

impl CerberusClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Config`] if the URL is empty or invalid, or the HTTP client
    ///   cannot be built
    pub fn new(config: &CerberusConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(StoreError::config_error("Cerberus URL cannot be empty"));
        }

        let base = Url::parse(&config.url)
            .map_err(|e| StoreError::config_error(format!("Invalid Cerberus URL: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::config_error(format!(
                "Cerberus URL cannot carry a path: {}",
                config.url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        let session = CerberusSession::new(config.token.clone(), config.token_expires_at);

        info!(url = %base, region = %config.region, "Created Cerberus client");
        Ok(Self { http, base, session })
    }

    /// Replace the session, e.g. after the auth collaborator refreshed it.
    pub fn with_session(mut self, session: CerberusSession) -> Self {
        self.session = session;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Resolve an SDB name to its root path (always `/`-terminated).
    ///
    /// # Errors
    ///
    /// - [`StoreError::Backend`] if the SDB listing call fails
    /// - [`StoreError::Config`] if no SDB with that name is visible to the session
    pub async fn resolve_sdb_path(&self, name: &str) -> Result<String> {
        let url = self.endpoint_url(["v2", "safe-deposit-box"])?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| StoreError::backend("resolve_sdb", name, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure("resolve_sdb", name, response).await);
        }

        let boxes: Vec<SdbSummary> = response
            .json()
            .await
            .map_err(|e| StoreError::backend("resolve_sdb", name, e.to_string()))?;

        let sdb = boxes.into_iter().find(|sdb| sdb.name == name).ok_or_else(|| {
            StoreError::config_error(format!("safe deposit box '{}' not found", name))
        })?;

        let path = if sdb.path.ends_with('/') { sdb.path } else { format!("{}/", sdb.path) };
        info!(sdb = %name, path = %path, "Resolved safe deposit box");
        Ok(path)
    }

    /// URL of a secret path. Each `/`-separated segment is percent-encoded, so
    /// `#` or `?` inside a key stay part of the path.
    fn secret_url(&self, path: &str) -> Result<Url> {
        let segments = path.trim_start_matches('/').split('/');
        self.endpoint_url(["v1", "secret"].into_iter().chain(segments))
    }

    fn endpoint_url<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::config_error(format!("Invalid Cerberus URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url).header(CLIENT_HEADER, CLIENT_ID);
        match self.session.token() {
            Some(token) => builder.header(TOKEN_HEADER, token.expose_secret()),
            None => builder,
        }
    }

    async fn failure(operation: &'static str, path: &str, response: Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
        error!(operation, path = %path, status = %status, "Cerberus request failed");
        StoreError::backend(operation, path, format!("status {}: {}", status, body))
    }
}

#[async_trait]
impl DocumentClient for CerberusClient {
    async fn list(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        let response = self
            .request(Method::GET, self.secret_url(prefix)?)
            .query(&[("list", "true")])
            .send()
            .await
            .map_err(|e| StoreError::backend("list", prefix, e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Self::failure("list", prefix, response).await);
        }

        let body: ListResponse =
            response.json().await.map_err(|e| StoreError::backend("list", prefix, e.to_string()))?;

        Ok(body
            .data
            .map(|data| data.keys.into_iter().map(ListEntry::from_key).collect())
            .unwrap_or_default())
    }

    async fn read(&self, path: &str, version: Option<&str>) -> Result<Option<PropertyMap>> {
        let mut request = self.request(Method::GET, self.secret_url(path)?);
        if let Some(version) = version {
            request = request.query(&[("versionId", version)]);
        }

        let response =
            request.send().await.map_err(|e| StoreError::backend("read", path, e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure("read", path, response).await);
        }

        let body: SecretResponse =
            response.json().await.map_err(|e| StoreError::backend("read", path, e.to_string()))?;

        Ok(Some(body.data.map(properties_from_json).unwrap_or_default()))
    }

    async fn write(&self, path: &str, properties: &PropertyMap) -> Result<()> {
        let response = self
            .request(Method::POST, self.secret_url(path)?)
            .json(&properties_to_text(properties))
            .send()
            .await
            .map_err(|e| StoreError::backend("write", path, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure("write", path, response).await);
        }

        debug!(path = %path, properties = properties.len(), "Wrote Cerberus document");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.secret_url(path)?)
            .send()
            .await
            .map_err(|e| StoreError::backend("delete", path, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::failure("delete", path, response).await);
        }

        debug!(path = %path, "Deleted Cerberus document");
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn backend_type(&self) -> DocumentBackendType {
        DocumentBackendType::Cerberus
    }
}
