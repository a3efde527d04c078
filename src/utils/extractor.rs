//! 路径参数提取器

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的 `{id}`，必须是正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

impl SafeIDI64 {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i64>().ok().filter(|id| *id > 0).map(Self)
    }
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        ready(Self::parse(raw).ok_or_else(|| {
            let response = HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                ErrorCode::InvalidArgument,
                format!("无效的成果ID: '{raw}'"),
            ));
            InternalError::from_response("invalid id", response).into()
        }))
    }
}
