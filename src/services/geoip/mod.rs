//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置的上游查询：
//! - `GeoProvider`: 上游查询抽象
//! - `FreeIpApiProvider`: FreeIPAPI HTTP 实现

mod free_ip_api;
mod provider;

pub use free_ip_api::FreeIpApiProvider;
pub use provider::{GeoProvider, IpRecord};
