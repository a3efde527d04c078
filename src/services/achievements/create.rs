use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AchievementService, error_code};
use crate::errors::{PortalError, Result};
use crate::models::achievements::{entities::Achievement, requests::CreateAchievementRequest};
use crate::models::users::entities::{Caller, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::Storage;
use crate::utils::validate;

/// 校验成果内容（创建与重新提交共用）
pub(crate) fn validate_submission(req: &CreateAchievementRequest) -> Result<()> {
    validate::validate_title(&req.title).map_err(PortalError::validation)?;
    validate::validate_content(&req.content).map_err(PortalError::validation)?;
    validate::validate_attachments(&req.attachments).map_err(PortalError::validation)?;
    Ok(())
}

/// 学生提交新成果，初始状态为待审核
pub async fn create(
    storage: &dyn Storage,
    caller: Caller,
    req: CreateAchievementRequest,
) -> Result<Achievement> {
    if caller.role != UserRole::Student {
        return Err(PortalError::forbidden("只有学生可以提交成果"));
    }
    validate_submission(&req)?;

    let achievement = storage.create_achievement(caller.id, req, None).await?;
    info!(
        "Achievement {} submitted by student {}",
        achievement.id, caller.id
    );
    Ok(achievement)
}

pub async fn create_achievement(
    service: &AchievementService,
    request: &HttpRequest,
    req: CreateAchievementRequest,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), caller, req).await {
        Ok(achievement) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(achievement, "成果提交成功")))
        }
        Err(e) => Ok(failure(&e, error_code(&e, ErrorCode::BadRequest))),
    }
}
