use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AchievementService, error_code};
use crate::errors::{PortalError, Result};
use crate::models::achievements::{
    entities::{Achievement, AchievementStatus},
    requests::UpdateAchievementRequest,
};
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::{Storage, conflict_for};
use crate::utils::validate;

fn validate_update(req: &UpdateAchievementRequest) -> Result<()> {
    if req.is_empty() {
        return Err(PortalError::validation("没有需要更新的字段"));
    }
    if let Some(title) = &req.title {
        validate::validate_title(title).map_err(PortalError::validation)?;
    }
    if let Some(content) = &req.content {
        validate::validate_content(content).map_err(PortalError::validation)?;
    }
    if let Some(attachments) = &req.attachments {
        validate::validate_attachments(attachments).map_err(PortalError::validation)?;
    }
    Ok(())
}

/// 提交者修改待审核成果
pub async fn update(
    storage: &dyn Storage,
    caller: Caller,
    achievement_id: i64,
    req: UpdateAchievementRequest,
) -> Result<Achievement> {
    let current = storage
        .get_achievement_by_id(achievement_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("成果不存在: {achievement_id}")))?;

    if current.owner_id != caller.id {
        return Err(PortalError::forbidden("只能修改自己提交的成果"));
    }
    if !current.is_pending() {
        return Err(conflict_for(
            achievement_id,
            AchievementStatus::Pending,
            current.status,
        ));
    }
    validate_update(&req)?;

    if let Some(updated) = storage
        .update_pending_achievement(achievement_id, caller.id, req)
        .await?
    {
        return Ok(updated);
    }

    // 条件写入未命中：读取后与审核并发
    let latest = storage
        .get_achievement_by_id(achievement_id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("成果不存在: {achievement_id}")))?;
    Err(conflict_for(
        achievement_id,
        AchievementStatus::Pending,
        latest.status,
    ))
}

pub async fn update_achievement(
    service: &AchievementService,
    request: &HttpRequest,
    achievement_id: i64,
    req: UpdateAchievementRequest,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), caller, achievement_id, req).await {
        Ok(achievement) => Ok(HttpResponse::Ok().json(ApiResponse::success(achievement, "更新成功"))),
        Err(e) => Ok(failure(
            &e,
            error_code(&e, ErrorCode::AchievementNotPending),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::reviews::entities::{ReviewTransition, ReviewVerdict};
    use crate::services::achievements::create::create;
    use crate::services::achievements::test_support::{request, student};
    use crate::storage::memory::MemoryStorage;
    use crate::utils::time;

    fn retitle(title: &str) -> UpdateAchievementRequest {
        UpdateAchievementRequest {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_owner_edits_pending() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("初稿")).await.unwrap();

        let edited = update(&storage, student(7), a.id, retitle("终稿"))
            .await
            .unwrap();
        assert_eq!(edited.title, "终稿");
        assert_eq!(edited.content, a.content);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("初稿")).await.unwrap();

        let err = update(&storage, student(8), a.id, retitle("篡改"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_reviewed_achievement_is_frozen() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("初稿")).await.unwrap();
        storage
            .commit_review(
                a.id,
                AchievementStatus::Pending,
                ReviewTransition {
                    verdict: ReviewVerdict::Approved { score: 88 },
                    reviewer_id: 3,
                    reviewed_at: time::now(),
                },
            )
            .await
            .unwrap();

        let err = update(&storage, student(7), a.id, retitle("改标题"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_empty_update_is_validation_error() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("初稿")).await.unwrap();

        let err = update(&storage, student(7), a.id, UpdateAchievementRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }
}
