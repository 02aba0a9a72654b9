//! # cerberus-store
//!
//! Property-level secret store adapter over Cerberus safe deposit boxes.
//!
//! Cerberus stores each secret path as one multi-property JSON document and
//! lists its namespace one level at a time. This crate exposes single
//! properties as secrets, finds documents by name pattern across nested
//! paths, and serializes concurrent read-modify-write cycles per document.
//!
//! ## Core Components
//!
//! - **Store**: [`secrets::SecretStore`] with get, find, push and delete
//! - **Backends**: Cerberus over HTTP, Vault KV v1 and an in-memory store
//! - **Configuration**: TOML file plus environment overrides
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cerberus_store::{connect_store, secrets::SecretRef, Result, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = StoreConfig::from_env()?;
//!     let store = connect_store(&config).await?;
//!     let password = store.get_secret(&SecretRef::new("db").with_property("password")).await?;
//!     println!("{} bytes", password.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod observability;
pub mod secrets;
pub mod startup;

// Re-export commonly used types
pub use config::StoreConfig;
pub use secrets::{Result, SecretStore, StoreError};
pub use startup::connect_store;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
