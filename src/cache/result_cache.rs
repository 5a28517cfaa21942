use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use moka::ops::compute::Op;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use crate::config::{CacheConfig, MAX_CACHE_TTL_SECS};
use crate::services::geoip::IpRecord;

/// 底层存储的 TTL 上限
const MAX_STORAGE_TTL: Duration = Duration::from_secs(MAX_CACHE_TTL_SECS);

/// 一条缓存记录，创建后不再修改，刷新时整体替换
#[derive(Debug, Clone)]
pub struct CacheEntry {
    record: IpRecord,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(record: IpRecord, created_at: DateTime<Utc>) -> Self {
        Self { record, created_at }
    }

    pub fn record(&self) -> &IpRecord {
        &self.record
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 年龄严格小于 TTL 才算新鲜
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.created_at < ttl
    }
}

/// IP → IpRecord 结果缓存
///
/// 新鲜度由注入的 [`Clock`] 判断（惰性过期）：超过 TTL 的条目即使还在
/// 存储里也按不存在处理，并在访问时移除。底层 Moka 的 TTL 和容量上限
/// 只负责回收内存，不影响可见行为。
pub struct ResultCache {
    inner: Cache<String, CacheEntry>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self::with_clock(ttl, max_capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        // Moka 不接受超过 1000 年的 TTL，新鲜度仍按原 TTL 判断
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl.min(MAX_STORAGE_TTL))
            .build();

        debug!(
            "ResultCache initialized with max capacity: {}, TTL: {}s",
            max_capacity,
            ttl.as_secs()
        );

        Self {
            inner,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_capacity)
    }

    /// 查询缓存，只返回新鲜的记录
    pub async fn get(&self, ip: &str) -> Option<IpRecord> {
        let entry = self.inner.get(ip).await?;

        if entry.is_fresh(self.clock.now(), self.ttl) {
            trace!("ResultCache hit for {}", ip);
            return Some(entry.record);
        }

        trace!(
            "ResultCache entry for {} is stale (created at {})",
            ip, entry.created_at
        );
        self.evict_if_stale(ip).await;
        None
    }

    /// 插入或替换记录，时间戳取当前时钟
    pub async fn put(&self, ip: &str, record: IpRecord) {
        let entry = CacheEntry::new(record, self.clock.now());
        self.inner.insert(ip.to_string(), entry).await;
        trace!("ResultCache stored record for {}", ip);
    }

    /// 当前物理存储的条目数（可能包含尚未回收的过期条目）
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// 执行 Moka 挂起的维护任务（计数、回收）
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    // 原子地重新检查：并发 put 已写入新条目时保留它
    async fn evict_if_stale(&self, ip: &str) {
        let now = self.clock.now();
        let ttl = self.ttl;

        let _ = self
            .inner
            .entry_by_ref(ip)
            .and_compute_with(|current| {
                let op = match current {
                    Some(entry) if !entry.value().is_fresh(now, ttl) => Op::Remove,
                    _ => Op::Nop,
                };
                std::future::ready(op)
            })
            .await;
    }
}
