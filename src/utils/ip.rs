//! IP 地址处理工具

use std::net::IpAddr;

/// 检查字符串是否为合法的 IPv4 或 IPv6 地址字面量
pub fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<IpAddr>().is_ok()
}
