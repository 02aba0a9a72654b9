//! Vault KV v1 document backend
//!
//! Serves the same whole-document contract from a HashiCorp Vault KV v1 mount.
//! KV v1 has no versions, so versioned reads are rejected.

use super::backend::{
    properties_from_json, properties_to_text, DocumentBackendType, DocumentClient, ListEntry,
    PropertyMap,
};
use crate::config::VaultKvConfig;
use crate::secrets::error::{Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::kv1;

pub struct VaultKvDocumentClient {
    client: VaultClient,
    mount: String,
}

impl fmt::Debug for VaultKvDocumentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKvDocumentClient").field("mount", &self.mount).finish_non_exhaustive()
    }
}

fn is_not_found(err: &ClientError) -> bool {
    matches!(err, ClientError::APIError { code: 404, .. })
}

impl VaultKvDocumentClient {
    /// Creates a client and checks that Vault is reachable.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Config`] if the address is empty or settings are invalid
    /// - [`StoreError::Backend`] if the health check fails
    pub async fn new(config: &VaultKvConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(StoreError::config_error("Vault address cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder.address(&config.address);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(namespace) = config.namespace.clone() {
            settings_builder.namespace(Some(namespace));
        }

        let settings = settings_builder.build().map_err(|e| {
            StoreError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            StoreError::config_error(format!("Failed to create Vault client: {}", e))
        })?;

        match vaultrs::sys::health(&client).await {
            Ok(_) => {
                info!(address = %config.address, mount = %config.mount, "Connected to Vault");
            }
            Err(e) => {
                error!(error = %e, address = %config.address, "Failed to connect to Vault");
                return Err(StoreError::backend("health", &config.address, e.to_string()));
            }
        }

        Ok(Self { client, mount: config.mount.clone() })
    }
}

#[async_trait]
impl DocumentClient for VaultKvDocumentClient {
    async fn list(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        match kv1::list(&self.client, &self.mount, prefix).await {
            Ok(response) => Ok(response.data.keys.into_iter().map(ListEntry::from_key).collect()),
            Err(e) if is_not_found(&e) => Ok(Vec::new()),
            Err(e) => Err(StoreError::backend("list", prefix, e.to_string())),
        }
    }

    async fn read(&self, path: &str, version: Option<&str>) -> Result<Option<PropertyMap>> {
        if let Some(version) = version {
            return Err(StoreError::invalid_request(format!(
                "version '{}' requested but Vault KV v1 mounts are not versioned",
                version
            )));
        }

        match kv1::get::<HashMap<String, Value>>(&self.client, &self.mount, path).await {
            Ok(data) => Ok(Some(properties_from_json(data))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(StoreError::backend("read", path, e.to_string())),
        }
    }

    async fn write(&self, path: &str, properties: &PropertyMap) -> Result<()> {
        let text = properties_to_text(properties);
        let data: HashMap<&str, String> =
            text.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

        kv1::set(&self.client, &self.mount, path, &data)
            .await
            .map_err(|e| StoreError::backend("write", path, e.to_string()))?;

        debug!(path = %path, mount = %self.mount, "Wrote Vault document");
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        kv1::delete(&self.client, &self.mount, path)
            .await
            .map_err(|e| StoreError::backend("delete", path, e.to_string()))?;

        debug!(path = %path, mount = %self.mount, "Deleted Vault document");
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        vaultrs::token::lookup_self(&self.client).await.is_ok()
    }

    fn backend_type(&self) -> DocumentBackendType {
        DocumentBackendType::VaultKv
    }
}
