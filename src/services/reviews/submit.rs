use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReviewService;
use crate::errors::ErrorKind;
use crate::models::reviews::requests::ReviewRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};

pub async fn submit_review(
    service: &ReviewService,
    request: &HttpRequest,
    achievement_id: i64,
    req: ReviewRequest,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };

    let engine = service.get_engine(request);
    let outcome = engine
        .submit_review(
            achievement_id,
            caller.id,
            caller.role,
            &req.decision,
            req.payload,
        )
        .await;

    match outcome {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result, "审核成功"))),
        Err(e) if e.kind() == ErrorKind::Conflict => {
            // 已被他人审核：返回当前状态供客户端展示
            let storage = service.get_storage(request);
            match storage.get_achievement_by_id(achievement_id).await {
                Ok(Some(current)) => Ok(HttpResponse::Conflict().json(ApiResponse::error(
                    ErrorCode::AlreadyReviewed,
                    current,
                    "该成果已被审核",
                ))),
                Ok(None) => Ok(failure(&e, ErrorCode::AlreadyReviewed)),
                Err(fetch_err) => Ok(failure(&fetch_err, ErrorCode::InternalServerError)),
            }
        }
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::NotFound => ErrorCode::AchievementNotFound,
                kind => ErrorCode::from_kind(kind),
            };
            Ok(failure(&e, code))
        }
    }
}
