//! # Structured Logging
//!
//! Subscriber setup and span macros for store operations. Spans carry paths
//! and property names only; secret values never reach a log field.

use crate::config::{LoggingConfig, StoreConfig};
use crate::secrets::{Result, StoreError};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Create a tracing span for a store operation.
///
/// ```rust,ignore
/// let span = store_span!("push_secret", path = %resolved);
/// ```
#[macro_export]
macro_rules! store_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "store_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `Ok(false)`
/// when a subscriber was already installed (e.g. by a test harness).
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(&config.level),
    }
    .map_err(|e| StoreError::config_error(format!("Invalid log filter: {}", e)))?;

    let builder = FmtSubscriber::builder().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    Ok(installed)
}

/// Log configuration at startup
pub fn log_config_info(config: &StoreConfig) {
    tracing::info!(
        backend = %config.backend,
        cerberus_url = %config.cerberus.url,
        sdb = ?config.cerberus.sdb,
        sdb_path = ?config.cerberus.sdb_path,
        region = %config.cerberus.region,
        max_traversal_depth = config.store.max_traversal_depth,
        "Secret store configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_compile() {
        let _span = store_span!("get_secret");
        let _span = store_span!("push_secret", path = "app/sdb/db", property = "password");
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_logging(&config).is_ok());
        // Second install always reports an existing subscriber
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_log_config_info() {
        log_config_info(&StoreConfig::default());
    }
}
