//! IP 查询编排
//!
//! 调用方唯一入口：缓存 → 限流 → 上游 → 写缓存。
//!
//! - 缓存命中：直接返回，不经过限流器和上游
//! - 未命中：申请许可，被拒绝时返回 `GeoError::RateLimited`
//! - 上游成功：写入缓存后返回；失败：原样返回，不写缓存（无负缓存）
//! - 不重试，也不对同一 IP 的并发未命中去重

use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::geoip::{GeoProvider, IpRecord};
use crate::cache::ResultCache;
use crate::errors::{GeoError, Result};
use crate::rate_limit::UpstreamRateLimiter;

#[derive(Clone)]
pub struct LookupService {
    cache: Arc<ResultCache>,
    limiter: Arc<UpstreamRateLimiter>,
    provider: Arc<dyn GeoProvider>,
}

impl LookupService {
    pub fn new(
        cache: Arc<ResultCache>,
        limiter: Arc<UpstreamRateLimiter>,
        provider: Arc<dyn GeoProvider>,
    ) -> Self {
        Self {
            cache,
            limiter,
            provider,
        }
    }

    /// 查询 IP 的地理位置
    ///
    /// `ip` 须已通过格式校验。
    pub async fn lookup(&self, ip: &str) -> Result<IpRecord> {
        if let Some(record) = self.cache.get(ip).await {
            trace!("Lookup cache hit for {}", ip);
            return Ok(record);
        }

        trace!("Lookup cache miss for {}", ip);

        let _permit = self.limiter.acquire().await.map_err(|rejected| {
            warn!(
                "Upstream rate limit reached, rejecting lookup for {} (retry after {:?})",
                ip, rejected.retry_after
            );
            GeoError::rate_limited(
                format!(
                    "Upstream rate limit exceeded, retry after {}ms",
                    rejected.retry_after.as_millis()
                ),
                rejected.retry_after,
            )
        })?;

        debug!("Fetching {} from {}", ip, self.provider.name());
        let record = self.provider.fetch(ip).await?;

        self.cache.put(ip, record.clone()).await;
        Ok(record)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn limiter(&self) -> &UpstreamRateLimiter {
        &self.limiter
    }
}
