//! Output formatting for CLI commands

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

/// Print data as JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Write a secret value to stdout, raw or base64 encoded.
pub fn print_value(value: &[u8], encode: bool) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    if encode {
        writeln!(stdout, "{}", STANDARD.encode(value))
    } else {
        stdout.write_all(value).and_then(|_| writeln!(stdout))
    }
    .context("Failed to write secret to stdout")
}

/// Render discovered secrets as text, keyed by flattened name.
pub fn secrets_as_text(secrets: &BTreeMap<String, Vec<u8>>) -> BTreeMap<&str, String> {
    secrets.iter().map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v).into_owned())).collect()
}

/// Print discovered secrets in the requested format
pub fn print_secrets(secrets: &BTreeMap<String, Vec<u8>>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&secrets_as_text(secrets)),
        OutputFormat::Table => {
            if secrets.is_empty() {
                println!("No matching secrets found");
                return Ok(());
            }
            let width = secrets.keys().map(String::len).max().unwrap_or(0).max(4);
            print_table_header(&[("KEY", width), ("SIZE", 8)]);
            for (key, value) in secrets {
                println!("{:<width$} {:>8}", key, value.len(), width = width);
            }
            println!();
            Ok(())
        }
    }
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    println!();
    let header: Vec<String> =
        columns.iter().map(|(name, width)| format!("{:<width$}", name, width = width)).collect();
    println!("{}", header.join(" "));
    let total: usize = columns.iter().map(|(_, w)| w + 1).sum();
    println!("{}", "-".repeat(total.saturating_sub(1)));
}
