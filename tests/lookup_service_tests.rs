//! 查询编排集成测试
//!
//! 使用脚本化的假 Provider 覆盖缓存命中、限流拒绝、错误传播和过期重取。

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use parking_lot::Mutex;

use ipgeo::cache::{ManualClock, ResultCache};
use ipgeo::errors::{ErrorKind, GeoError, Result};
use ipgeo::rate_limit::UpstreamRateLimiter;
use ipgeo::services::{GeoProvider, IpRecord, LookupService};

// =============================================================================
// 测试辅助
// =============================================================================

/// 按脚本依次返回结果的 Provider，脚本耗尽后返回默认记录
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<IpRecord>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<IpRecord>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoProvider for ScriptedProvider {
    async fn fetch(&self, ip: &str) -> Result<IpRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or_else(|| {
            Ok(IpRecord {
                ip_address: ip.to_string(),
                ..Default::default()
            })
        })
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}

fn test_record() -> IpRecord {
    IpRecord {
        ip_address: "1.2.3.4".to_string(),
        continent: "Europe".to_string(),
        country: "Testland".to_string(),
        region: "TestRegion".to_string(),
        city: "TestCity".to_string(),
        latitude: 10.0,
        longitude: 20.0,
    }
}

/// 宽松限流器，避免测试受许可影响
fn generous_limiter() -> Arc<UpstreamRateLimiter> {
    Arc::new(UpstreamRateLimiter::new(1000, Duration::from_secs(1), Duration::ZERO).unwrap())
}

fn build_service(
    provider: Arc<ScriptedProvider>,
    limiter: Arc<UpstreamRateLimiter>,
    clock: Arc<ManualClock>,
) -> LookupService {
    let cache = Arc::new(ResultCache::with_clock(
        Duration::from_secs(30 * 24 * 3600),
        1_000,
        clock,
    ));
    LookupService::new(cache, limiter, provider)
}

// =============================================================================
// 端到端场景
// =============================================================================

#[tokio::test]
async fn test_fresh_lookup_then_cache_hit() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(test_record())]));
    let service = build_service(
        provider.clone(),
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let first = service.lookup("1.2.3.4").await.unwrap();
    assert_eq!(first, test_record());

    let second = service.lookup("1.2.3.4").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_upstream_4xx_is_invalid_request_and_not_cached() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(GeoError::invalid_request("Invalid IP or bad request: 1.2.3.4")),
        Ok(test_record()),
    ]));
    let service = build_service(
        provider.clone(),
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let err = service.lookup("1.2.3.4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert!(service.cache().get("1.2.3.4").await.is_none());

    // 没有负缓存，下一次仍然调用上游
    let record = service.lookup("1.2.3.4").await.unwrap();
    assert_eq!(record, test_record());
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_upstream_5xx_is_unavailable() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(
        GeoError::upstream_unavailable("FreeIPAPI server error: 500"),
    )]));
    let service = build_service(
        provider.clone(),
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let err = service.lookup("1.2.3.4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(matches!(err, GeoError::UpstreamUnavailable(_)));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_upstream_timeout_propagates_unchanged() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(GeoError::upstream_timeout(
        "Timeout after 5s calling FreeIPAPI",
    ))]));
    let service = build_service(
        provider,
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let err = service.lookup("1.2.3.4").await.unwrap_err();
    assert!(matches!(err, GeoError::UpstreamTimeout(_)));
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_empty_record_is_success() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(IpRecord::default())]));
    let service = build_service(
        provider.clone(),
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let record = service.lookup("10.0.0.1").await.unwrap();
    assert_eq!(record, IpRecord::default());
    assert_eq!(service.cache().get("10.0.0.1").await, Some(IpRecord::default()));
}

// =============================================================================
// 限流
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rejects_extra_misses() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let limiter = Arc::new(
        UpstreamRateLimiter::new(3, Duration::from_secs(60), Duration::ZERO).unwrap(),
    );
    let service = build_service(
        provider.clone(),
        limiter,
        Arc::new(ManualClock::default()),
    );

    let ips = ["1.1.1.1", "2.2.2.2", "3.3.3.3", "4.4.4.4"];
    let mut rejected = 0;
    for ip in ips {
        match service.lookup(ip).await {
            Ok(record) => assert_eq!(record.ip_address, ip),
            Err(err) => {
                assert!(matches!(err, GeoError::RateLimited { .. }));
                let retry_after = err.retry_after().unwrap();
                assert!(retry_after > Duration::ZERO && retry_after <= Duration::from_secs(60));
                assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
                rejected += 1;
            }
        }
    }

    assert_eq!(rejected, 1);
    // 被拒绝的调用不会到达上游
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_permits_not_refilled_before_period_ends() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let limiter = Arc::new(
        UpstreamRateLimiter::new(2, Duration::from_secs(1), Duration::ZERO).unwrap(),
    );
    let service = build_service(
        provider.clone(),
        limiter,
        Arc::new(ManualClock::default()),
    );

    service.lookup("1.1.1.1").await.unwrap();
    service.lookup("2.2.2.2").await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;

    let err = service.lookup("3.3.3.3").await.unwrap_err();
    assert!(matches!(err, GeoError::RateLimited { .. }));
    assert!(err.retry_after().unwrap() <= Duration::from_millis(400));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_cache_hit_does_not_consume_permit() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(test_record())]));
    let limiter = Arc::new(
        UpstreamRateLimiter::new(1, Duration::from_secs(60), Duration::ZERO).unwrap(),
    );
    let service = build_service(
        provider.clone(),
        limiter,
        Arc::new(ManualClock::default()),
    );

    service.lookup("1.2.3.4").await.unwrap();
    for _ in 0..10 {
        assert_eq!(service.lookup("1.2.3.4").await.unwrap(), test_record());
    }

    // 许可已用完，新 IP 被拒绝
    let err = service.lookup("5.6.7.8").await.unwrap_err();
    assert!(matches!(err, GeoError::RateLimited { .. }));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_misses_respect_permit_count() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let limiter = Arc::new(
        UpstreamRateLimiter::new(5, Duration::from_secs(60), Duration::ZERO).unwrap(),
    );
    let service = build_service(
        provider.clone(),
        limiter,
        Arc::new(ManualClock::default()),
    );

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.lookup(&format!("10.0.0.{}", i)).await
        }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            granted += 1;
        }
    }

    assert_eq!(granted, 5);
    assert_eq!(provider.calls(), 5);
}

// =============================================================================
// 过期
// =============================================================================

#[tokio::test]
async fn test_stale_entry_triggers_refetch() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut updated = test_record();
    updated.city = "NewCity".to_string();

    let provider = Arc::new(ScriptedProvider::new(vec![Ok(test_record()), Ok(updated.clone())]));
    let service = build_service(provider.clone(), generous_limiter(), clock.clone());

    assert_eq!(service.lookup("1.2.3.4").await.unwrap(), test_record());

    clock.advance(TimeDelta::days(29));
    assert_eq!(service.lookup("1.2.3.4").await.unwrap(), test_record());
    assert_eq!(provider.calls(), 1);

    // 年龄恰好等于 TTL 即视为过期
    clock.advance(TimeDelta::days(1));
    assert_eq!(service.lookup("1.2.3.4").await.unwrap(), updated);
    assert_eq!(provider.calls(), 2);

    assert_eq!(service.lookup("1.2.3.4").await.unwrap(), updated);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_failed_refetch_leaves_no_entry() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(test_record()),
        Err(GeoError::upstream_unavailable("FreeIPAPI server error: 503")),
    ]));
    let service = build_service(provider.clone(), generous_limiter(), clock.clone());

    service.lookup("1.2.3.4").await.unwrap();
    clock.advance(TimeDelta::days(31));

    let err = service.lookup("1.2.3.4").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert!(service.cache().get("1.2.3.4").await.is_none());
}

#[tokio::test]
async fn test_distinct_ips_are_cached_independently() {
    let provider = Arc::new(ScriptedProvider::new(Vec::new()));
    let service = build_service(
        provider.clone(),
        generous_limiter(),
        Arc::new(ManualClock::default()),
    );

    let a = service.lookup("1.1.1.1").await.unwrap();
    let b = service.lookup("2001:db8::1").await.unwrap();
    assert_eq!(a.ip_address, "1.1.1.1");
    assert_eq!(b.ip_address, "2001:db8::1");

    service.lookup("1.1.1.1").await.unwrap();
    service.lookup("2001:db8::1").await.unwrap();
    assert_eq!(provider.calls(), 2);
}
