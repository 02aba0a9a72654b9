//! # Observability
//!
//! Structured logging for the secret store adapter.

pub mod logging;

pub use logging::{init_logging, log_config_info};
