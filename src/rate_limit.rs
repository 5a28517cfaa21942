//! 上游调用限流
//!
//! 固定窗口计数，进程内共享一个限流器：
//! - 每个周期最多放行 `permits_per_period` 个许可
//! - 窗口边界按创建时刻对齐，`now >= window_start + period` 时重置计数
//! - `max_wait` 为 0 时非阻塞，拿不到许可立即拒绝

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::RateLimitConfig;

/// 一次上游调用的放行凭证
#[must_use = "a permit should be held for the upstream call it admits"]
#[derive(Debug)]
pub struct Permit {
    _private: (),
}

/// 限流拒绝，附带距下一个窗口边界的时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejected {
    pub retry_after: Duration,
}

/// 当前窗口的起点和已放行数
#[derive(Debug)]
struct Window {
    start: Instant,
    used: u32,
}

pub struct UpstreamRateLimiter {
    window: Mutex<Window>,
    permits_per_period: u32,
    period: Duration,
    max_wait: Duration,
}

impl UpstreamRateLimiter {
    pub fn new(permits_per_period: u32, period: Duration, max_wait: Duration) -> Result<Self, String> {
        if permits_per_period == 0 {
            return Err("permits_per_period must be greater than 0".to_string());
        }
        if period.is_zero() {
            return Err("rate limit period must be greater than 0".to_string());
        }

        debug!(
            "Upstream rate limiter created: {} permits per {:?}, max wait {:?}",
            permits_per_period, period, max_wait
        );

        Ok(Self {
            window: Mutex::new(Window {
                start: Instant::now(),
                used: 0,
            }),
            permits_per_period,
            period,
            max_wait,
        })
    }

    pub fn from_config(config: &RateLimitConfig) -> Result<Self, String> {
        Self::new(
            config.permits_per_period,
            config.period(),
            config.max_wait(),
        )
    }

    /// 申请一个许可
    ///
    /// 当前窗口还有余量时直接放行；否则在 `max_wait` 内等待下一个窗口，
    /// 下一个边界超出等待期限时拒绝。
    pub async fn acquire(&self) -> Result<Permit, Rejected> {
        let deadline = Instant::now() + self.max_wait;

        loop {
            let now = Instant::now();
            let wait = match self.try_acquire_at(now) {
                Ok(()) => {
                    trace!("Rate limiter permit granted");
                    return Ok(Permit { _private: () });
                }
                Err(wait) => wait,
            };

            if now + wait > deadline {
                trace!("Rate limiter rejected, next window in {:?}", wait);
                return Err(Rejected { retry_after: wait });
            }

            // 边界到达后可能被其他等待者抢先，重新检查
            tokio::time::sleep(wait).await;
        }
    }

    /// 在给定时刻尝试占用一个许可，失败时返回距下一个窗口边界的时间
    fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut window = self.window.lock();

        let elapsed = now.saturating_duration_since(window.start);
        if elapsed >= self.period {
            let into_window = elapsed.as_nanos() % self.period.as_nanos();
            window.start = now - Duration::from_nanos(into_window as u64);
            window.used = 0;
        }

        if window.used < self.permits_per_period {
            window.used += 1;
            Ok(())
        } else {
            Err((window.start + self.period).saturating_duration_since(now))
        }
    }

    pub fn permits_per_period(&self) -> u32 {
        self.permits_per_period
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}
