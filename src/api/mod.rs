//! HTTP 边界层
//!
//! 把 `LookupService` 暴露为 `GET /ip/{ip}`，并把错误分类映射为 HTTP 状态码。

pub mod error_code;
pub mod helpers;
pub mod middleware;
pub mod services;
pub mod types;

pub use error_code::ErrorCode;
pub use types::{ApiResponse, HealthResponse};
