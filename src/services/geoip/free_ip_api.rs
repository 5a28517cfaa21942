//! FreeIPAPI 上游实现
//!
//! `GET {base_url}/{ip}`，返回 JSON：
//! `{"ipAddress", "continent", "countryName", "regionName", "cityName", "latitude", "longitude"}`

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace, warn};
use ureq::Agent;

use super::provider::{GeoProvider, IpRecord};
use crate::config::UpstreamConfig;
use crate::errors::{GeoError, Result};

const PROVIDER_NAME: &str = "FreeIPAPI";

/// 上游响应体，缺失或为 null 的字段按空值处理
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreeIpApiResponse {
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    continent: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
    #[serde(default)]
    city_name: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl FreeIpApiResponse {
    fn into_record(self) -> IpRecord {
        IpRecord {
            ip_address: self.ip_address.unwrap_or_default(),
            continent: self.continent.unwrap_or_default(),
            country: self.country_name.unwrap_or_default(),
            region: self.region_name.unwrap_or_default(),
            city: self.city_name.unwrap_or_default(),
            latitude: self.latitude.unwrap_or_default(),
            longitude: self.longitude.unwrap_or_default(),
        }
    }
}

/// FreeIPAPI Provider
///
/// ureq 是同步客户端，请求在 `spawn_blocking` 中执行；
/// 超时由 Agent 的全局超时控制。
pub struct FreeIpApiProvider {
    base_url: String,
    timeout: Duration,
    agent: Agent,
}

impl FreeIpApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        debug!(
            "{} provider created: base_url={}, timeout={:?}",
            PROVIDER_NAME, base_url, timeout
        );

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            agent,
        }
    }

    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lookup_url(&self, ip: &str) -> String {
        format!("{}/{}", self.base_url, ip)
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_blocking(agent: &Agent, url: &str, ip: &str, timeout: Duration) -> Result<IpRecord> {
        let resp = agent
            .get(url)
            .call()
            .map_err(|e| classify_error(e, ip, timeout))?;

        let body: FreeIpApiResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| classify_error(e, ip, timeout))?;

        Ok(body.into_record())
    }
}

/// 将 ureq 错误映射为查询错误
pub(crate) fn classify_error(err: ureq::Error, ip: &str, timeout: Duration) -> GeoError {
    match err {
        ureq::Error::StatusCode(status) if (400..500).contains(&status) => {
            GeoError::invalid_request(format!("Invalid IP or bad request: {}", ip))
        }
        ureq::Error::StatusCode(status) => {
            GeoError::upstream_unavailable(format!("{} server error: {}", PROVIDER_NAME, status))
        }
        ureq::Error::Timeout(_) => timeout_error(timeout),
        ureq::Error::Io(ref e) if e.kind() == io::ErrorKind::TimedOut => timeout_error(timeout),
        ureq::Error::Json(e) => GeoError::upstream_unavailable(format!(
            "Empty or unparseable response from {} for IP {}: {}",
            PROVIDER_NAME, ip, e
        )),
        other => GeoError::upstream_unavailable(format!(
            "{} request failed: {}",
            PROVIDER_NAME, other
        )),
    }
}

fn timeout_error(timeout: Duration) -> GeoError {
    GeoError::upstream_timeout(format!(
        "Timeout after {:?} calling {}",
        timeout, PROVIDER_NAME
    ))
}

#[async_trait]
impl GeoProvider for FreeIpApiProvider {
    async fn fetch(&self, ip: &str) -> Result<IpRecord> {
        let url = self.lookup_url(ip);
        let agent = self.agent.clone();
        let ip_owned = ip.to_string();
        let timeout = self.timeout;

        trace!("{} request: GET {}", PROVIDER_NAME, url);

        let result = tokio::task::spawn_blocking(move || {
            Self::fetch_blocking(&agent, &url, &ip_owned, timeout)
        })
        .await
        .unwrap_or_else(|e| {
            Err(GeoError::upstream_unavailable(format!(
                "{} request task failed: {}",
                PROVIDER_NAME, e
            )))
        });

        if let Err(ref e) = result {
            warn!("{} lookup for {} failed: {}", PROVIDER_NAME, ip, e);
        }
        result
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
