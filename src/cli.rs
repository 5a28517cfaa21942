//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// ipgeo - IP geolocation lookup service
#[derive(Parser, Debug)]
#[command(name = "ipgeo")]
#[command(version)]
#[command(about = "IP geolocation lookup service with a cached, rate-limited upstream", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Look up a single IP address and print the record as JSON
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,
    },

    /// Generate a sample configuration file
    GenerateConfig {
        /// Output file path (default: config.example.toml)
        output_path: Option<String>,
    },
}
