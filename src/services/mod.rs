//! Service layer for business logic
//!
//! This module provides the lookup logic shared between the HTTP API and
//! the one-shot CLI lookup.

pub mod geoip;
mod lookup;

pub use geoip::{FreeIpApiProvider, GeoProvider, IpRecord};
pub use lookup::LookupService;
