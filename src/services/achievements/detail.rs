use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AchievementService, ensure_can_view, error_code};
use crate::errors::{PortalError, Result};
use crate::models::achievements::entities::Achievement;
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::Storage;

pub async fn get(storage: &dyn Storage, caller: Caller, achievement_id: i64) -> Result<Achievement> {
    let achievement = storage
        .get_achievement_by_id(achievement_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("成果不存在: {achievement_id}")))?;
    ensure_can_view(&caller, &achievement)?;
    Ok(achievement)
}

pub async fn get_achievement(
    service: &AchievementService,
    request: &HttpRequest,
    achievement_id: i64,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match get(storage.as_ref(), caller, achievement_id).await {
        Ok(achievement) => Ok(HttpResponse::Ok().json(ApiResponse::success(achievement, "获取成功"))),
        Err(e) => Ok(failure(&e, error_code(&e, ErrorCode::BadRequest))),
    }
}
