//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::GeoError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 3000-3099: 查询请求错误（调用方可归因）
/// - 4000-4099: 上游错误（调用方不可归因）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 查询请求错误 3000-3099
    InvalidIpAddress = 3000,
    UpstreamRejectedRequest = 3001,

    // 上游错误 4000-4099
    UpstreamUnavailable = 4000,
    UpstreamTimeout = 4001,
    UpstreamRateLimited = 4002,
}

impl From<&GeoError> for ErrorCode {
    fn from(err: &GeoError) -> Self {
        match err {
            GeoError::InvalidInput(_) => ErrorCode::InvalidIpAddress,
            GeoError::InvalidRequest(_) => ErrorCode::UpstreamRejectedRequest,
            GeoError::UpstreamUnavailable(_) => ErrorCode::UpstreamUnavailable,
            GeoError::UpstreamTimeout(_) => ErrorCode::UpstreamTimeout,
            GeoError::RateLimited { .. } => ErrorCode::UpstreamRateLimited,
        }
    }
}
