pub mod achievements;
pub mod notifications;
pub mod reviews;

pub use achievements::AchievementService;
pub use notifications::{NotificationEmitter, NotificationHub};
pub use reviews::{ReviewEngine, ReviewService};

use actix_web::{HttpRequest, HttpResponse};
use tracing::error;

use crate::errors::{ErrorKind, PortalError};
use crate::middlewares::RequireJWT;
use crate::models::common::response::error_response;
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};

/// 从请求中取出已验证的调用方，缺失时返回 401 响应
pub(crate) fn require_caller(request: &HttpRequest) -> Result<Caller, HttpResponse> {
    RequireJWT::extract_caller(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "无法获取用户信息",
        ))
    })
}

/// 业务错误转换为响应，内部错误写入日志
pub(crate) fn failure(err: &PortalError, code: ErrorCode) -> HttpResponse {
    if err.kind() == ErrorKind::InternalError {
        error!("{}", err.format_simple());
    }
    error_response(err, code)
}
