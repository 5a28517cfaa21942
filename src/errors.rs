use std::fmt;
use std::time::Duration;

use actix_web::http::StatusCode;

/// Lookup failure taxonomy as seen by callers
///
/// `UpstreamTimeout` 和 `RateLimited` 都归入 `UpstreamUnavailable`，
/// 细分变体只用于日志和响应头。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidRequest,
    UpstreamUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// IP 字符串格式非法（在边界层检测）
    InvalidInput(String),
    /// 上游返回 4xx
    InvalidRequest(String),
    /// 上游 5xx、传输失败、响应体为空或无法解析
    UpstreamUnavailable(String),
    /// 上游请求超时
    UpstreamTimeout(String),
    /// 限流器拒绝放行，`retry_after` 为距下一个限流窗口的时间
    RateLimited { message: String, retry_after: Duration },
}

impl GeoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeoError::InvalidInput(_) => "E001",
            GeoError::InvalidRequest(_) => "E002",
            GeoError::UpstreamUnavailable(_) => "E003",
            GeoError::UpstreamTimeout(_) => "E004",
            GeoError::RateLimited { .. } => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoError::InvalidInput(_) => "Invalid Input",
            GeoError::InvalidRequest(_) => "Invalid Request",
            GeoError::UpstreamUnavailable(_) => "Upstream Unavailable",
            GeoError::UpstreamTimeout(_) => "Upstream Timeout",
            GeoError::RateLimited { .. } => "Upstream Rate Limited",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeoError::InvalidInput(msg) => msg,
            GeoError::InvalidRequest(msg) => msg,
            GeoError::UpstreamUnavailable(msg) => msg,
            GeoError::UpstreamTimeout(msg) => msg,
            GeoError::RateLimited { message, .. } => message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoError::InvalidInput(_) => ErrorKind::InvalidInput,
            GeoError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            GeoError::UpstreamUnavailable(_)
            | GeoError::UpstreamTimeout(_)
            | GeoError::RateLimited { .. } => ErrorKind::UpstreamUnavailable,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            GeoError::InvalidInput(_) | GeoError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GeoError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GeoError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GeoError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// 限流拒绝时的建议重试间隔
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeoError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// 格式化为彩色输出（用于启动和 CLI 错误）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeoError {}

// 便捷的构造函数
impl GeoError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        GeoError::InvalidInput(msg.into())
    }

    pub fn invalid_request<T: Into<String>>(msg: T) -> Self {
        GeoError::InvalidRequest(msg.into())
    }

    pub fn upstream_unavailable<T: Into<String>>(msg: T) -> Self {
        GeoError::UpstreamUnavailable(msg.into())
    }

    pub fn upstream_timeout<T: Into<String>>(msg: T) -> Self {
        GeoError::UpstreamTimeout(msg.into())
    }

    pub fn rate_limited<T: Into<String>>(msg: T, retry_after: Duration) -> Self {
        GeoError::RateLimited {
            message: msg.into(),
            retry_after,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
