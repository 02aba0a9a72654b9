//! # Command Line Interface
//!
//! Reads, writes and discovers secret properties in a safe deposit box from
//! the shell.

pub mod output;

use crate::config::StoreConfig;
use crate::observability::{init_logging, log_config_info};
use crate::secrets::{
    DocumentBackendType, FindRequest, PushRef, SecretRef, SecretStore, ValidationResult,
};
use crate::startup::connect_store;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cerberus-store")]
#[command(about = "Property-level access to Cerberus safe deposit boxes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file
    #[arg(long, global = true, env = "CERBERUS_STORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend override (cerberus, vault_kv, in_memory)
    #[arg(long, global = true)]
    pub backend: Option<DocumentBackendType>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read one property, or the whole document as JSON
    Get {
        /// Document key relative to the SDB
        key: String,

        /// Property to read
        #[arg(short, long)]
        property: Option<String>,

        /// Version token of the document
        #[arg(long)]
        version: Option<String>,

        /// Print the value base64 encoded
        #[arg(long)]
        base64: bool,
    },

    /// Find documents whose name matches a pattern
    Find {
        /// Path below the SDB to search (default: the whole SDB)
        #[arg(long)]
        path: Option<String>,

        /// Glob pattern applied to document names
        #[arg(short, long)]
        name: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },

    /// Set one property of a document
    Push {
        /// Document key relative to the SDB
        key: String,

        /// Property to set
        property: String,

        /// Value to store
        value: String,

        /// Decode the value from base64 before storing
        #[arg(long)]
        base64: bool,
    },

    /// Remove one property of a document
    Delete {
        /// Document key relative to the SDB
        key: String,

        /// Property to remove
        property: String,
    },

    /// Check that the backend session is usable
    Validate,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&config.logging).context("Failed to initialise logging")?;
    log_config_info(&config);

    let store = connect_store(&config).await.context("Failed to connect to secret store")?;
    let result = handle_command(cli.command, &store).await;
    store.close().await?;
    result
}

/// Resolve configuration: file (if any), then environment, then flags.
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StoreConfig::default(),
    };

    config.apply_env_overrides().context("Invalid environment configuration")?;

    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }

    Ok(config)
}

async fn handle_command(command: Commands, store: &SecretStore) -> Result<()> {
    match command {
        Commands::Get { key, property, version, base64 } => {
            let mut secret_ref = SecretRef::new(key);
            if let Some(property) = property {
                secret_ref = secret_ref.with_property(property);
            }
            if let Some(version) = version {
                secret_ref = secret_ref.with_version(version);
            }
            let value = store.get_secret(&secret_ref).await?;
            output::print_value(&value, base64)?;
        }
        Commands::Find { path, name, output } => {
            let find = FindRequest { path, name, tags: None };
            let secrets = store.get_all_secrets(&find).await?;
            output::print_secrets(&secrets, output)?;
        }
        Commands::Push { key, property, value, base64 } => {
            let bytes = if base64 {
                STANDARD.decode(value.trim()).context("Value is not valid base64")?
            } else {
                value.into_bytes()
            };
            store.push_secret(&PushRef::new(key.as_str(), property.as_str()), &bytes).await?;
            println!("Set property '{}' on '{}'", property, key);
        }
        Commands::Delete { key, property } => {
            store.delete_secret(&PushRef::new(key.as_str(), property.as_str())).await?;
            println!("Removed property '{}' from '{}'", property, key);
        }
        Commands::Validate => {
            let result = store.validate().await;
            println!("{}", result);
            if result == ValidationResult::Error {
                anyhow::bail!("secret store is not ready");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_push_with_globals() {
        let cli = Cli::try_parse_from([
            "cerberus-store",
            "push",
            "team/db",
            "pass",
            "eDE=",
            "--base64",
            "--backend",
            "in_memory",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.backend, Some(DocumentBackendType::InMemory));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Push { base64: true, .. }));
    }

    #[test]
    fn test_flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "cerberus-store",
            "--backend",
            "memory",
            "--json-logs",
            "validate",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.backend, DocumentBackendType::InMemory);
        assert!(config.logging.json);
    }

    #[tokio::test]
    async fn test_handle_push_get_delete() {
        let store = SecretStore::new(
            std::sync::Arc::new(crate::secrets::InMemoryDocumentClient::new()),
            "sdb",
        );

        let push = Commands::Push {
            key: "team/db".to_string(),
            property: "pass".to_string(),
            value: "eDE=".to_string(),
            base64: true,
        };
        handle_command(push, &store).await.unwrap();
        let value = store.get_secret(&SecretRef::new("team/db").with_property("pass")).await;
        assert_eq!(value.unwrap(), b"x1");

        let delete = Commands::Delete { key: "team/db".to_string(), property: "pass".to_string() };
        handle_command(delete, &store).await.unwrap();
        assert_eq!(store.get_secret(&SecretRef::new("team/db")).await.unwrap(), b"{}");
    }
}
