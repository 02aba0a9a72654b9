//! Pluggable document backends
//!
//! Every backend stores whole multi-property documents at hierarchical paths
//! and exposes them through the [`DocumentClient`] trait.
//!
//! ## Supported Backends
//!
//! - **Cerberus**: safe deposit boxes over the Cerberus HTTP API
//! - **Vault KV**: HashiCorp Vault KV v1 mount
//! - **In-memory**: process-local map for tests and dry runs

pub mod backend;
pub mod cerberus;
pub mod memory;
pub mod vault;

pub use backend::{DocumentBackendType, DocumentClient, ListEntry, PropertyMap, SEPARATOR};
pub use cerberus::{CerberusClient, CerberusSession};
pub use memory::InMemoryDocumentClient;
pub use vault::VaultKvDocumentClient;
