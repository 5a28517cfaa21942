//! IP 查询结果缓存
//!
//! - `ResultCache`: 基于 Moka 的 TTL 缓存，惰性过期
//! - `Clock`: 可注入的时间来源（测试中使用 `ManualClock`）

pub mod clock;
pub mod result_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use result_cache::{CacheEntry, ResultCache};
