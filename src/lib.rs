//! ipgeo - IP geolocation lookup service
//!
//! Resolves IP addresses to geographic records through a single upstream
//! provider, guarded by a result cache and an outbound rate limiter.
//!
//! # Architecture
//! - `services`: lookup orchestration and GeoIP providers
//! - `cache`: TTL result cache with lazy expiry
//! - `rate_limit`: outbound upstream call limiter
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging and signal handling

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod rate_limit;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
