//! Document client trait and wire-boundary types
//!
//! Defines the interface the store consumes from a hierarchical backend. Every
//! implementation decodes its native listing and read responses into the typed
//! shapes here, so the store never deals with untyped payloads.

use crate::secrets::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Property name to value. Ordered so serialized documents are deterministic.
pub type PropertyMap = BTreeMap<String, Vec<u8>>;

/// Namespace separator used by hierarchical backends.
pub const SEPARATOR: char = '/';

/// One entry of a single-level listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Entry name relative to the listed prefix (sub-prefixes keep their trailing `/`)
    pub name: String,
    /// Whether the entry is a sub-prefix rather than a document
    pub is_prefix: bool,
}

impl ListEntry {
    /// Decode a raw listing key; a trailing separator marks a sub-prefix.
    pub fn from_key(key: impl Into<String>) -> Self {
        let name = key.into();
        let is_prefix = name.ends_with(SEPARATOR);
        Self { name, is_prefix }
    }
}

/// Kind of document backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentBackendType {
    /// Cerberus safe deposit boxes
    #[default]
    Cerberus,
    /// HashiCorp Vault KV v1 mount
    VaultKv,
    /// Process-local store
    InMemory,
}

impl DocumentBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cerberus => "cerberus",
            Self::VaultKv => "vault_kv",
            Self::InMemory => "in_memory",
        }
    }
}

impl FromStr for DocumentBackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cerberus" => Ok(Self::Cerberus),
            "vault_kv" | "vault" => Ok(Self::VaultKv),
            "in_memory" | "memory" => Ok(Self::InMemory),
            _ => Err(format!("Unknown document backend type: {}", s)),
        }
    }
}

impl fmt::Display for DocumentBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole-document client for a hierarchical secret backend.
///
/// Paths passed in are fully resolved (root prefix already applied).
#[async_trait]
pub trait DocumentClient: Send + Sync + fmt::Debug {
    /// List the entries directly under `prefix`. A missing prefix lists as empty.
    async fn list(&self, prefix: &str) -> Result<Vec<ListEntry>>;

    /// Read the whole document at `path`, optionally at a specific version.
    ///
    /// Returns `Ok(None)` when no document exists at the path.
    async fn read(&self, path: &str, version: Option<&str>) -> Result<Option<PropertyMap>>;

    /// Replace the whole document at `path` with `properties`.
    async fn write(&self, path: &str, properties: &PropertyMap) -> Result<()>;

    /// Delete the document at `path`.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Whether the client currently holds an authenticated session.
    async fn is_authenticated(&self) -> bool;

    /// Backend kind, for logging.
    fn backend_type(&self) -> DocumentBackendType;
}

/// Convert a decoded JSON property value to bytes. Strings are taken verbatim,
/// anything else keeps its JSON text.
pub(crate) fn value_to_bytes(value: Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.into_bytes(),
        other => other.to_string().into_bytes(),
    }
}

/// Decode a JSON object body into a property map.
pub(crate) fn properties_from_json(data: HashMap<String, Value>) -> PropertyMap {
    data.into_iter().map(|(k, v)| (k, value_to_bytes(v))).collect()
}

/// Render property values as text for backends that store strings.
pub(crate) fn properties_to_text(properties: &PropertyMap) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), String::from_utf8_lossy(v).into_owned()))
        .collect()
}
