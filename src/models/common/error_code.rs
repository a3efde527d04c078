use serde::Serialize;

use crate::errors::{ErrorKind, PortalError};

/// 响应体中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    InvalidArgument = 1001,
    ValidationFailed = 1002,
    Unauthorized = 1003,
    Forbidden = 1004,
    NotFound = 1005,
    RateLimitExceeded = 1006,

    // 成果相关 2xxx
    AchievementNotFound = 2001,
    AchievementNotPending = 2002,
    ResubmissionNotAllowed = 2003,

    // 审核相关 3xxx
    AlreadyReviewed = 3001,

    // 服务端错误 5xxx
    InternalServerError = 5000,
}

impl ErrorCode {
    /// 从错误类别推断通用错误码
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Forbidden => ErrorCode::Forbidden,
            ErrorKind::InvalidArgument => ErrorCode::InvalidArgument,
            ErrorKind::ValidationError => ErrorCode::ValidationFailed,
            ErrorKind::Conflict => ErrorCode::AlreadyReviewed,
            ErrorKind::InternalError => ErrorCode::InternalServerError,
        }
    }
}

impl From<&PortalError> for ErrorCode {
    fn from(err: &PortalError) -> Self {
        ErrorCode::from_kind(err.kind())
    }
}
