//! GeoIP Provider 抽象层
//!
//! 上游地理位置服务的统一查询接口。实现只负责单次网络调用和错误分类，
//! 不做缓存也不做限流，这两者由 `LookupService` 在外层组合。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 一个 IP 的地理位置记录
///
/// 字段由上游提供，字符串可能为空。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRecord {
    pub ip_address: String,
    pub continent: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// GeoIP 上游查询 trait
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// 对上游发起一次请求（不重试）
    ///
    /// - 4xx → `GeoError::InvalidRequest`
    /// - 5xx / 传输失败 / 响应体为空或无法解析 → `GeoError::UpstreamUnavailable`
    /// - 超时 → `GeoError::UpstreamTimeout`
    async fn fetch(&self, ip: &str) -> Result<IpRecord>;

    /// 获取 provider 名称（用于日志和健康检查）
    fn name(&self) -> &'static str;
}
