//! In-memory document backend
//!
//! Keeps documents in a process-local map keyed by full path. Listing derives
//! sub-prefixes from the stored paths the same way a hierarchical backend
//! would. Used for tests and local dry runs; version tokens are ignored.

use super::backend::{DocumentBackendType, DocumentClient, ListEntry, PropertyMap, SEPARATOR};
use crate::secrets::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
pub struct InMemoryDocumentClient {
    documents: RwLock<BTreeMap<String, PropertyMap>>,
    authenticated: AtomicBool,
}

impl InMemoryDocumentClient {
    /// Create an empty, authenticated store.
    pub fn new() -> Self {
        Self { documents: RwLock::new(BTreeMap::new()), authenticated: AtomicBool::new(true) }
    }

    /// Create a store seeded with documents.
    pub fn with_documents(documents: BTreeMap<String, PropertyMap>) -> Self {
        Self { documents: RwLock::new(documents), authenticated: AtomicBool::new(true) }
    }

    /// Toggle the reported session state.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Insert or replace a document directly.
    pub async fn insert(&self, path: impl Into<String>, properties: PropertyMap) {
        self.documents.write().await.insert(path.into(), properties);
    }

    /// Snapshot of a stored document.
    pub async fn document(&self, path: &str) -> Option<PropertyMap> {
        self.documents.read().await.get(path).cloned()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether no documents are stored.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Default for InMemoryDocumentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentClient for InMemoryDocumentClient {
    async fn list(&self, prefix: &str) -> Result<Vec<ListEntry>> {
        let documents = self.documents.read().await;
        let mut prefixes = BTreeSet::new();
        let mut entries = Vec::new();

        for path in documents.keys() {
            let Some(rest) = path.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.find(SEPARATOR) {
                Some(idx) => {
                    let sub = &rest[..=idx];
                    if prefixes.insert(sub.to_string()) {
                        entries.push(ListEntry::from_key(sub));
                    }
                }
                None => entries.push(ListEntry::from_key(rest)),
            }
        }

        debug!(prefix = %prefix, entries = entries.len(), "Listed in-memory prefix");
        Ok(entries)
    }

    async fn read(&self, path: &str, _version: Option<&str>) -> Result<Option<PropertyMap>> {
        Ok(self.documents.read().await.get(path).cloned())
    }

    async fn write(&self, path: &str, properties: &PropertyMap) -> Result<()> {
        self.documents.write().await.insert(path.to_string(), properties.clone());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.documents.write().await.remove(path);
        Ok(())
    }

    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn backend_type(&self) -> DocumentBackendType {
        DocumentBackendType::InMemory
    }
}
