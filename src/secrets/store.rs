//! Secret store facade over a whole-document backend.
//!
//! Exposes property-level reads and writes on top of a backend that only
//! stores complete documents. Reads take no lock. Every mutation runs a
//! read-modify-write cycle under the exclusive lock for the resolved document
//! path, so concurrent writes to different properties of one document are
//! serialized instead of overwriting each other.
//!
//! # Example
//!
//! ```rust,ignore
//! use cerberus_store::secrets::{InMemoryDocumentClient, PushRef, SecretRef, SecretStore};
//! use std::sync::Arc;
//!
//! let store = SecretStore::new(Arc::new(InMemoryDocumentClient::new()), "app/payments/");
//!
//! store.push_secret(&PushRef::new("team/db", "user"), b"admin").await?;
//! store.push_secret(&PushRef::new("team/db", "pass"), b"x1").await?;
//!
//! let whole = store.get_secret(&SecretRef::new("team/db")).await?;
//! assert_eq!(whole, br#"{"pass":"x1","user":"admin"}"#);
//! ```

use super::backends::{DocumentClient, PropertyMap, SEPARATOR};
use super::error::{Result, StoreError};
use super::locks::KeyedLocks;
use super::matcher::NameMatcher;
use super::traversal::{PathWalker, DEFAULT_MAX_DEPTH};
use super::types::{FindRequest, PushRef, SecretRef, ValidationResult};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Instrument};

/// Property-level secret operations for one backend root (an SDB path).
#[derive(Clone)]
pub struct SecretStore {
    client: Arc<dyn DocumentClient>,
    root: String,
    locks: Arc<KeyedLocks>,
    max_depth: usize,
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("backend", &self.client.backend_type())
            .field("root", &self.root)
            .field("locked_paths", &self.locks.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl SecretStore {
    /// Create a store whose keys resolve below `root`.
    ///
    /// A non-empty root is made `/`-terminated.
    pub fn new(client: Arc<dyn DocumentClient>, root: impl Into<String>) -> Self {
        let mut root = root.into();
        if !root.is_empty() && !root.ends_with(SEPARATOR) {
            root.push(SEPARATOR);
        }

        Self { client, root, locks: Arc::new(KeyedLocks::new()), max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Share a lock registry with other stores pointed at the same backend.
    pub fn with_locks(mut self, locks: Arc<KeyedLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Bound how deep discovery may descend.
    pub fn with_max_traversal_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn locks(&self) -> &Arc<KeyedLocks> {
        &self.locks
    }

    /// Full backend path for a store-relative key.
    pub fn resolve(&self, key: &str) -> String {
        format!("{}{}", self.root, key.trim_start_matches(SEPARATOR))
    }

    /// Read every property of a document. An absent document is an empty map.
    #[instrument(skip(self, secret_ref), fields(key = %secret_ref.key))]
    pub async fn get_secret_map(&self, secret_ref: &SecretRef) -> Result<PropertyMap> {
        let path = self.resolve(&secret_ref.key);
        let properties = self.client.read(&path, secret_ref.version()).await?;
        if properties.is_none() {
            debug!(path = %path, "Document absent, treating as empty");
        }
        Ok(properties.unwrap_or_default())
    }

    /// Read one property, or the whole document serialized as a JSON object.
    ///
    /// # Errors
    ///
    /// - [`StoreError::MissingProperty`] if a property was requested and is absent
    /// - [`StoreError::Backend`] if the read fails
    pub async fn get_secret(&self, secret_ref: &SecretRef) -> Result<Vec<u8>> {
        let mut properties = self.get_secret_map(secret_ref).await?;

        let Some(property) = secret_ref.property() else {
            return serialize_document(&properties);
        };

        properties.remove(property).ok_or_else(|| StoreError::missing_property(property))
    }

    /// Fetch every document below a path whose name matches a pattern.
    ///
    /// Result keys are the document paths relative to the search path with
    /// separators replaced by `_`. Distinct paths can flatten to the same key
    /// (`a/b_c` and `a_b/c`); the later one wins.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnsupportedFilter`] if tags are set (no backend calls are made)
    /// - [`StoreError::Pattern`] if the name pattern is malformed
    /// - [`StoreError::TraversalTooDeep`] if discovery exceeds the depth bound
    /// - [`StoreError::Backend`] on the first failed listing or read
    #[instrument(skip(self, find), fields(path = ?find.path, name = ?find.name))]
    pub async fn get_all_secrets(&self, find: &FindRequest) -> Result<BTreeMap<String, Vec<u8>>> {
        if find.tags.is_some() {
            return Err(StoreError::unsupported_filter("tags"));
        }

        let search_path = match find.path.as_deref() {
            None => SEPARATOR.to_string(),
            Some(path) if path.ends_with(SEPARATOR) => path.to_string(),
            Some(path) => format!("{}{}", path, SEPARATOR),
        };

        let matcher = NameMatcher::new(find.name.as_deref().unwrap_or("*"))?;
        let walker = PathWalker::new(self.client.as_ref(), &self.root, self.max_depth);
        let paths = walker
            .find_matching_paths(&search_path, &|name: &str| matcher.matches(name))
            .await?;

        let mut results = BTreeMap::new();
        for path in paths {
            let data = self.get_secret(&SecretRef::new(path.as_str())).await?;
            let relative = path.strip_prefix(search_path.as_str()).unwrap_or(&path);
            let key = relative.replace(SEPARATOR, "_");
            if results.insert(key.clone(), data).is_some() {
                warn!(key = %key, path = %path, "Flattened secret key collision, keeping later path");
            }
        }

        info!(search_path = %search_path, found = results.len(), "Collected matching secrets");
        Ok(results)
    }

    /// Set one property, preserving every other property of the document.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidRequest`] if the property name is empty
    /// - [`StoreError::Backend`] if the read or the write fails
    #[instrument(
        skip(self, push_ref, value),
        fields(key = %push_ref.remote_key, property = %push_ref.property)
    )]
    pub async fn push_secret(&self, push_ref: &PushRef, value: &[u8]) -> Result<()> {
        let path = self.mutation_path(push_ref)?;
        let span = crate::store_span!("push_secret", path = %path);

        async {
            let lock = self.locks.acquire(&path);
            let _guard = lock.write().await;

            let mut properties = self.client.read(&path, None).await?.unwrap_or_default();
            properties.insert(push_ref.property.clone(), value.to_vec());
            self.client.write(&path, &properties).await?;

            info!(properties = properties.len(), "Pushed secret property");
            Ok::<(), StoreError>(())
        }
        .instrument(span)
        .await
    }

    /// Remove one property; deletes the document once it has no properties left.
    ///
    /// Removing a property that is not there is a no-op.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidRequest`] if the property name is empty
    /// - [`StoreError::Backend`] if the read, write or delete fails
    #[instrument(
        skip(self, push_ref),
        fields(key = %push_ref.remote_key, property = %push_ref.property)
    )]
    pub async fn delete_secret(&self, push_ref: &PushRef) -> Result<()> {
        let path = self.mutation_path(push_ref)?;
        let span = crate::store_span!("delete_secret", path = %path);

        async {
            let lock = self.locks.acquire(&path);
            let _guard = lock.write().await;

            let Some(mut properties) = self.client.read(&path, None).await? else {
                debug!("Document absent, nothing to delete");
                return Ok(());
            };
            properties.remove(&push_ref.property);

            if properties.is_empty() {
                self.client.delete(&path).await?;
                info!("Deleted secret document after removing last property");
            } else {
                self.client.write(&path, &properties).await?;
                info!(properties = properties.len(), "Removed secret property");
            }

            Ok::<(), StoreError>(())
        }
        .instrument(span)
        .await
    }

    /// Report whether the backend session is usable.
    pub async fn validate(&self) -> ValidationResult {
        validate_client(Some(self.client.as_ref())).await
    }

    /// Release resources held for the store. Nothing to release today.
    pub async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn mutation_path(&self, push_ref: &PushRef) -> Result<String> {
        if push_ref.property.is_empty() {
            return Err(StoreError::invalid_request("property must be set"));
        }
        Ok(self.resolve(&push_ref.remote_key))
    }
}

/// Readiness of an optional client: `Ready` only with an authenticated session.
pub async fn validate_client(client: Option<&dyn DocumentClient>) -> ValidationResult {
    let Some(client) = client else {
        warn!("No backend client configured");
        return ValidationResult::Error;
    };

    if client.is_authenticated().await {
        ValidationResult::Ready
    } else {
        warn!(backend = %client.backend_type(), "Backend session is not authenticated");
        ValidationResult::Error
    }
}

/// Serialize a whole document as a JSON object, values rendered as text.
fn serialize_document(properties: &PropertyMap) -> Result<Vec<u8>> {
    let text: BTreeMap<&str, Cow<'_, str>> =
        properties.iter().map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v))).collect();
    Ok(serde_json::to_vec(&text)?)
}
