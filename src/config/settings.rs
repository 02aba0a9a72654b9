//! # Configuration Settings
//!
//! Defines the configuration structure for the secret store adapter.

use crate::secrets::{DocumentBackendType, Result, SecretString, StoreError, DEFAULT_MAX_DEPTH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Backend selection (`cerberus`, `vault_kv`, `in_memory`)
pub const ENV_BACKEND: &str = "CERBERUS_STORE_BACKEND";
pub const ENV_CERBERUS_URL: &str = "CERBERUS_URL";
pub const ENV_CERBERUS_SDB: &str = "CERBERUS_SDB";
pub const ENV_CERBERUS_SDB_PATH: &str = "CERBERUS_SDB_PATH";
pub const ENV_CERBERUS_REGION: &str = "CERBERUS_REGION";
pub const ENV_CERBERUS_ROLE: &str = "CERBERUS_ROLE";
/// Comma-separated role ARNs assumed in order before `CERBERUS_ROLE`
pub const ENV_CERBERUS_ADDITIONAL_ROLES: &str = "CERBERUS_ADDITIONAL_ROLES";
pub const ENV_CERBERUS_EXTERNAL_ID: &str = "CERBERUS_EXTERNAL_ID";
pub const ENV_CERBERUS_TOKEN: &str = "CERBERUS_TOKEN";
pub const ENV_CERBERUS_TIMEOUT_SECONDS: &str = "CERBERUS_TIMEOUT_SECONDS";
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";
pub const ENV_VAULT_NAMESPACE: &str = "VAULT_NAMESPACE";
pub const ENV_VAULT_KV_MOUNT: &str = "VAULT_KV_MOUNT";
pub const ENV_STORE_ROOT: &str = "CERBERUS_STORE_ROOT";
pub const ENV_MAX_DEPTH: &str = "CERBERUS_STORE_MAX_DEPTH";
pub const ENV_LOG_LEVEL: &str = "CERBERUS_STORE_LOG_LEVEL";
pub const ENV_JSON_LOGS: &str = "CERBERUS_STORE_JSON_LOGS";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Which document backend to talk to
    pub backend: DocumentBackendType,

    /// Cerberus backend configuration
    #[validate(nested)]
    pub cerberus: CerberusConfig,

    /// Vault KV backend configuration
    #[validate(nested)]
    pub vault: VaultKvConfig,

    /// Store behaviour
    #[validate(nested)]
    pub store: StoreSettings,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load a TOML configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            StoreError::config_error(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Overlay values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable source. Unset variables leave
    /// the current value untouched.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(ENV_BACKEND) {
            self.backend = backend.parse().map_err(StoreError::config_error)?;
        }

        if let Some(url) = lookup(ENV_CERBERUS_URL) {
            self.cerberus.url = url;
        }
        if let Some(sdb) = lookup(ENV_CERBERUS_SDB) {
            self.cerberus.sdb = Some(sdb);
        }
        if let Some(path) = lookup(ENV_CERBERUS_SDB_PATH) {
            self.cerberus.sdb_path = Some(path);
        }
        if let Some(region) = lookup(ENV_CERBERUS_REGION).or_else(|| lookup("AWS_REGION")) {
            self.cerberus.region = region;
        }
        if let Some(role) = lookup(ENV_CERBERUS_ROLE) {
            self.cerberus.role = Some(role);
        }
        if let Some(roles) = lookup(ENV_CERBERUS_ADDITIONAL_ROLES) {
            self.cerberus.additional_roles = roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(external_id) = lookup(ENV_CERBERUS_EXTERNAL_ID) {
            self.cerberus.external_id = Some(external_id);
        }
        if let Some(token) = lookup(ENV_CERBERUS_TOKEN) {
            self.cerberus.token = Some(SecretString::new(token));
        }
        if let Some(timeout) = lookup(ENV_CERBERUS_TIMEOUT_SECONDS) {
            self.cerberus.timeout_seconds = parse_var(ENV_CERBERUS_TIMEOUT_SECONDS, &timeout)?;
        }

        if let Some(address) = lookup(ENV_VAULT_ADDR) {
            self.vault.address = address;
        }
        if let Some(token) = lookup(ENV_VAULT_TOKEN) {
            self.vault.token = Some(SecretString::new(token));
        }
        if let Some(namespace) = lookup(ENV_VAULT_NAMESPACE) {
            self.vault.namespace = Some(namespace);
        }
        if let Some(mount) = lookup(ENV_VAULT_KV_MOUNT) {
            self.vault.mount = mount;
        }

        if let Some(root) = lookup(ENV_STORE_ROOT) {
            self.store.root = Some(root);
        }
        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            self.store.max_traversal_depth = parse_var(ENV_MAX_DEPTH, &depth)?;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(json) = lookup(ENV_JSON_LOGS) {
            self.logging.json = json.eq_ignore_ascii_case("true") || json == "1";
        }

        Ok(())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| StoreError::config_error(e.to_string()))?;

        self.validate_custom()
    }

    /// Checks that depend on the selected backend
    fn validate_custom(&self) -> Result<()> {
        match self.backend {
            DocumentBackendType::Cerberus => {
                if self.cerberus.url.is_empty() {
                    return Err(StoreError::config_error("Cerberus URL must be set"));
                }
                url::Url::parse(&self.cerberus.url).map_err(|e| {
                    StoreError::config_error(format!("Invalid Cerberus URL: {}", e))
                })?;
                if self.cerberus.sdb.is_none() && self.cerberus.sdb_path.is_none() {
                    return Err(StoreError::config_error(
                        "Either an SDB name or an SDB path must be set",
                    ));
                }
                if self.cerberus.additional_roles.iter().any(|r| r.trim().is_empty()) {
                    return Err(StoreError::config_error("Additional roles cannot be empty"));
                }
            }
            DocumentBackendType::VaultKv => {
                if self.vault.address.is_empty() {
                    return Err(StoreError::config_error("Vault address must be set"));
                }
            }
            DocumentBackendType::InMemory => {}
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(StoreError::config_error(format!(
                "Unknown log level '{}', expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| StoreError::config_error(format!("Invalid {}: {}", name, e)))
}

/// AWS STS session tag applied when assuming roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTag {
    pub key: String,
    pub value: String,
}

/// Cerberus connection and session configuration.
///
/// The role chain, session tags and external id are consumed by the session
/// setup that produces `token`; the document client itself only needs the
/// URL, the token and the SDB.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CerberusConfig {
    /// Cerberus base URL
    pub url: String,

    /// SDB name, resolved to a path through the API
    pub sdb: Option<String>,

    /// SDB root path (e.g. `app/payments/`); takes precedence over `sdb`
    pub sdb_path: Option<String>,

    /// AWS region used for authentication
    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,

    /// Role ARN to assume
    pub role: Option<String>,

    /// Role ARNs assumed in order before `role`
    pub additional_roles: Vec<String>,

    /// STS session tags
    pub session_tags: Vec<SessionTag>,

    /// Tag keys that carry over to chained role sessions
    pub transitive_tag_keys: Vec<String>,

    /// External id set on assumed roles
    pub external_id: Option<String>,

    /// Session token issued by the auth collaborator
    pub token: Option<SecretString>,

    /// When `token` stops being valid
    pub token_expires_at: Option<DateTime<Utc>>,

    /// HTTP request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for CerberusConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            sdb: None,
            sdb_path: None,
            region: "us-west-2".to_string(),
            role: None,
            additional_roles: Vec::new(),
            session_tags: Vec::new(),
            transitive_tag_keys: Vec::new(),
            external_id: None,
            token: None,
            token_expires_at: None,
            timeout_seconds: 30,
        }
    }
}

impl CerberusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Vault KV v1 configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultKvConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    pub address: String,

    /// Vault authentication token
    pub token: Option<SecretString>,

    /// Vault namespace (for Enterprise multi-tenancy)
    pub namespace: Option<String>,

    /// KV v1 mount path
    #[validate(length(min = 1, message = "Mount path cannot be empty"))]
    pub mount: String,
}

impl Default for VaultKvConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            mount: "secret".to_string(),
        }
    }
}

/// Store behaviour independent of the backend
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreSettings {
    /// Root prefix for non-Cerberus backends
    pub root: Option<String>,

    /// Deepest sub-prefix nesting discovery will follow
    #[validate(range(min = 1, max = 1024, message = "Max depth must be between 1 and 1024"))]
    pub max_traversal_depth: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { root: None, max_traversal_depth: DEFAULT_MAX_DEPTH }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
