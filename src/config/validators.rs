//! 配置值验证模块
//!
//! 启动前检查会让核心组件无法工作的配置值。

use super::{MAX_CACHE_TTL_SECS, StaticConfig};

/// 验证整个静态配置，返回第一个不合法的配置项
pub fn validate_config(config: &StaticConfig) -> Result<(), String> {
    let base_url = config.upstream.base_url.trim();
    if base_url.is_empty() {
        return Err("upstream.base_url must not be empty".to_string());
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(format!(
            "upstream.base_url must start with http:// or https://, got '{}'",
            base_url
        ));
    }
    if config.upstream.timeout_ms == 0 {
        return Err("upstream.timeout_ms must be greater than 0".to_string());
    }

    if config.rate_limit.permits_per_period == 0 {
        return Err("rate_limit.permits_per_period must be greater than 0".to_string());
    }
    if config.rate_limit.period_ms == 0 {
        return Err("rate_limit.period_ms must be greater than 0".to_string());
    }

    if config.cache.ttl_secs == 0 {
        return Err("cache.ttl_secs must be greater than 0".to_string());
    }
    if config.cache.ttl_secs > MAX_CACHE_TTL_SECS {
        return Err(format!(
            "cache.ttl_secs must not exceed {} (100 years), got {}",
            MAX_CACHE_TTL_SECS, config.cache.ttl_secs
        ));
    }
    if config.cache.max_capacity == 0 {
        return Err("cache.max_capacity must be greater than 0".to_string());
    }

    match config.logging.format.as_str() {
        "text" | "json" => Ok(()),
        other => Err(format!(
            "Invalid logging.format: '{}'. Valid: text, json",
            other
        )),
    }
}
