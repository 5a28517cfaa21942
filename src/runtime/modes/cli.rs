//! One-shot lookup mode
//!
//! Resolves a single IP through the same cache, limiter and provider stack
//! as the server and prints the record as JSON.

use colored::Colorize;
use tracing::debug;

use crate::config::StaticConfig;
use crate::errors::GeoError;
use crate::runtime::lifetime::startup::build_lookup_service;
use crate::utils::ip::is_valid_ip;

/// Run a single lookup and print the result to stdout
///
/// Returns `Ok(false)` when the lookup failed; the error has already been
/// printed to stderr.
pub async fn run_lookup(config: &StaticConfig, ip: &str) -> anyhow::Result<bool> {
    if !is_valid_ip(ip) {
        let err = GeoError::invalid_input(format!("Invalid IP address: {}", ip));
        eprintln!("{}", err.format_colored());
        return Ok(false);
    }

    let service = build_lookup_service(config)?;
    debug!("Running one-shot lookup for {}", ip);

    match service.lookup(ip).await {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(true)
        }
        Err(err) => {
            eprintln!("{}", err.format_colored());
            eprintln!("  {} {:?}", "kind:".dimmed(), err.kind());
            Ok(false)
        }
    }
}
