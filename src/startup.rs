//! Store construction from configuration
//!
//! Picks the document backend, determines the store root and applies the
//! store settings.

use crate::config::StoreConfig;
use crate::secrets::{
    CerberusClient, DocumentBackendType, DocumentClient, InMemoryDocumentClient, Result,
    SecretStore, VaultKvDocumentClient,
};
use std::sync::Arc;
use tracing::info;

/// Build a [`SecretStore`] for the configured backend.
///
/// For Cerberus the root is the configured SDB path, or the path the SDB name
/// resolves to. Other backends use `store.root` (empty when unset).
pub async fn connect_store(config: &StoreConfig) -> Result<SecretStore> {
    config.validate()?;

    let (client, root): (Arc<dyn DocumentClient>, String) = match config.backend {
        DocumentBackendType::Cerberus => {
            let client = CerberusClient::new(&config.cerberus)?;
            let root = match (&config.cerberus.sdb_path, &config.cerberus.sdb) {
                (Some(path), _) => path.trim_start_matches('/').to_string(),
                (None, Some(name)) => client.resolve_sdb_path(name).await?,
                (None, None) => String::new(),
            };
            (Arc::new(client), root)
        }
        DocumentBackendType::VaultKv => {
            let client = VaultKvDocumentClient::new(&config.vault).await?;
            (Arc::new(client), config.store.root.clone().unwrap_or_default())
        }
        DocumentBackendType::InMemory => (
            Arc::new(InMemoryDocumentClient::new()),
            config.store.root.clone().unwrap_or_default(),
        ),
    };

    let store = SecretStore::new(client, root)
        .with_max_traversal_depth(config.store.max_traversal_depth);

    info!(backend = %config.backend, root = %store.root(), "Secret store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::StoreError;

    #[tokio::test]
    async fn test_in_memory_store_uses_configured_root() {
        let mut config = StoreConfig { backend: DocumentBackendType::InMemory, ..Default::default() };
        config.store.root = Some("scratch".to_string());
        config.store.max_traversal_depth = 4;

        let store = connect_store(&config).await.unwrap();
        assert_eq!(store.root(), "scratch/");
        assert!(format!("{:?}", store).contains("max_depth: 4"));
    }

    #[tokio::test]
    async fn test_cerberus_sdb_path_skips_resolution() {
        let mut config = StoreConfig::default();
        config.cerberus.url = "http://127.0.0.1:9".to_string();
        config.cerberus.sdb_path = Some("/app/payments".to_string());

        let store = connect_store(&config).await.unwrap();
        assert_eq!(store.root(), "app/payments/");
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_connecting() {
        let config = StoreConfig::default();
        let err = connect_store(&config).await.unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }
}
