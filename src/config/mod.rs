//! # Configuration Management
//!
//! Loads adapter configuration from defaults, an optional TOML file and
//! environment variables, in that order of precedence (environment wins).

pub mod settings;

pub use settings::{
    CerberusConfig, LoggingConfig, SessionTag, StoreConfig, StoreSettings, VaultKvConfig,
};
