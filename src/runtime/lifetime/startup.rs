use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::config::StaticConfig;
use crate::rate_limit::UpstreamRateLimiter;
use crate::services::{FreeIpApiProvider, GeoProvider, LookupService};

/// 根据静态配置组装查询服务
/// 包括结果缓存、上游限流器和 GeoIP 提供者
pub fn build_lookup_service(config: &StaticConfig) -> Result<LookupService> {
    let start_time = std::time::Instant::now();
    debug!("Assembling lookup service...");

    let cache = Arc::new(ResultCache::from_config(&config.cache));
    debug!(
        "Result cache initialized (ttl: {}s, max_capacity: {})",
        config.cache.ttl_secs, config.cache.max_capacity
    );

    let limiter = UpstreamRateLimiter::from_config(&config.rate_limit)
        .map_err(anyhow::Error::msg)
        .context("Failed to create upstream rate limiter")?;
    debug!(
        "Upstream rate limiter initialized ({} permit(s) per {:?}, max wait {:?})",
        limiter.permits_per_period(),
        limiter.period(),
        limiter.max_wait()
    );

    let provider: Arc<dyn GeoProvider> = Arc::new(FreeIpApiProvider::from_config(&config.upstream));
    info!(
        "Using GeoIP provider: {} ({})",
        provider.name(),
        config.upstream.base_url
    );

    let service = LookupService::new(cache, Arc::new(limiter), provider);
    debug!("Lookup service ready in {:?}", start_time.elapsed());

    Ok(service)
}
