//! 驳回后重新提交
//!
//! 被驳回的实例保持不变，重新提交创建一个新的待审核实例并通过 `previous_id` 关联。
//! 每个被驳回的实例只能重新提交一次。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::create::validate_submission;
use super::{AchievementService, error_code};
use crate::errors::{PortalError, Result};
use crate::models::achievements::{
    entities::{Achievement, AchievementStatus},
    requests::CreateAchievementRequest,
};
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::{Storage, conflict_for};

pub async fn resubmit(
    storage: &dyn Storage,
    caller: Caller,
    prior_id: i64,
    req: CreateAchievementRequest,
) -> Result<Achievement> {
    let prior = storage
        .get_achievement_by_id(prior_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("成果不存在: {prior_id}")))?;

    if prior.owner_id != caller.id {
        return Err(PortalError::forbidden("只能重新提交自己的成果"));
    }
    if prior.status != AchievementStatus::Rejected {
        return Err(conflict_for(
            prior_id,
            AchievementStatus::Rejected,
            prior.status,
        ));
    }
    if let Some(existing) = storage.get_achievement_by_previous_id(prior_id).await? {
        return Err(PortalError::conflict(format!(
            "成果 {prior_id} 已经重新提交为 {}",
            existing.id
        )));
    }
    validate_submission(&req)?;

    // 并发重复提交由 previous_id 唯一约束兜底
    let achievement = storage
        .create_achievement(caller.id, req, Some(prior_id))
        .await?;
    info!(
        "Achievement {} resubmitted as {} by student {}",
        prior_id, achievement.id, caller.id
    );
    Ok(achievement)
}

pub async fn resubmit_achievement(
    service: &AchievementService,
    request: &HttpRequest,
    achievement_id: i64,
    req: CreateAchievementRequest,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match resubmit(storage.as_ref(), caller, achievement_id, req).await {
        Ok(achievement) => Ok(HttpResponse::Created()
            .json(ApiResponse::success(achievement, "重新提交成功"))),
        Err(e) => Ok(failure(
            &e,
            error_code(&e, ErrorCode::ResubmissionNotAllowed),
        )),
    }
}
