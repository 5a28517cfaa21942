//! IP 查询接口
//!
//! `GET /ip/{ip}`：校验 IP 格式后调用 `LookupService`。

use actix_web::http::header;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::helpers::{error_from_geo, success_response};
use crate::errors::GeoError;
use crate::services::LookupService;
use crate::utils::ip::is_valid_ip;

pub struct IpLookupService;

impl IpLookupService {
    pub async fn get_ip_info(
        path: web::Path<String>,
        lookup: web::Data<LookupService>,
    ) -> impl Responder {
        let ip = path.into_inner();
        trace!("Received lookup request for {}", ip);

        // 格式非法直接返回 400，不进入查询流程
        if !is_valid_ip(&ip) {
            debug!("Rejected invalid IP address: {}", ip);
            return error_from_geo(&GeoError::invalid_input(format!(
                "Invalid IP address: {}",
                ip
            )));
        }

        match lookup.lookup(&ip).await {
            Ok(record) => success_response(record),
            Err(err) => Self::failure_response(&err),
        }
    }

    fn failure_response(err: &GeoError) -> HttpResponse {
        let mut response = error_from_geo(err);

        // 向上取整到秒，至少 1 秒
        if let Some(retry_after) = err.retry_after() {
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, header::HeaderValue::from(secs));
        }

        response
    }
}

/// IP 查询路由配置
pub fn lookup_routes() -> actix_web::Scope {
    web::scope("/ip").route("/{ip}", web::get().to(IpLookupService::get_ip_info))
}
