pub mod health;
pub mod lookup;

pub use health::{AppStartTime, HealthService, health_routes};
pub use lookup::{IpLookupService, lookup_routes};
