//! Property-level secret store over hierarchical document backends.
//!
//! Backends such as Cerberus store one JSON document per path and list their
//! namespace one level at a time. This module turns that into a secret-store
//! contract where callers read and write individual properties and discover
//! documents by name pattern.
//!
//! # Architecture
//!
//! - [`SecretStore`]: the facade (`get_secret`, `get_all_secrets`,
//!   `push_secret`, `delete_secret`, `validate`)
//! - [`PathWalker`]: recursive discovery with a [`NameMatcher`] predicate
//! - [`KeyedLocks`]: one lock per resolved document path, serializing
//!   read-modify-write cycles on the same document
//! - [`backends`]: the [`DocumentClient`] trait and its implementations
//!
//! # Security Considerations
//!
//! - Secret values are never logged; only paths and property names are
//! - Session tokens are held in [`SecretString`] and redacted everywhere

pub mod backends;
pub mod error;
pub mod locks;
pub mod matcher;
pub mod store;
pub mod traversal;
pub mod types;

pub use backends::{
    CerberusClient, CerberusSession, DocumentBackendType, DocumentClient, InMemoryDocumentClient,
    ListEntry, PropertyMap, VaultKvDocumentClient,
};
pub use error::{Result, StoreError};
pub use locks::{KeyLock, KeyedLocks};
pub use matcher::NameMatcher;
pub use store::{validate_client, SecretStore};
pub use traversal::{NamePredicate, PathWalker, DEFAULT_MAX_DEPTH};
pub use types::{FindRequest, PushRef, SecretRef, SecretString, ValidationResult};
