use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AchievementService, detail, error_code};
use crate::errors::Result;
use crate::models::reviews::responses::AuditListResponse;
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::Storage;

/// 列出成果的审核记录，按决定时间排序
pub async fn list(
    storage: &dyn Storage,
    caller: Caller,
    achievement_id: i64,
) -> Result<AuditListResponse> {
    detail::get(storage, caller, achievement_id).await?;
    let items = storage.list_audits_by_achievement(achievement_id).await?;
    Ok(AuditListResponse { items })
}

pub async fn list_audits(
    service: &AchievementService,
    request: &HttpRequest,
    achievement_id: i64,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match list(storage.as_ref(), caller, achievement_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取成功"))),
        Err(e) => Ok(failure(&e, error_code(&e, ErrorCode::BadRequest))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::achievements::entities::AchievementStatus;
    use crate::models::reviews::entities::{AuditDecision, ReviewTransition, ReviewVerdict};
    use crate::services::achievements::create::create;
    use crate::services::achievements::test_support::{request, student, teacher};
    use crate::storage::memory::MemoryStorage;
    use crate::utils::time;

    #[tokio::test]
    async fn test_audits_visible_to_owner_and_reviewers() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("专利授权")).await.unwrap();
        storage
            .commit_review(
                a.id,
                AchievementStatus::Pending,
                ReviewTransition {
                    verdict: ReviewVerdict::Approved { score: 95 },
                    reviewer_id: 3,
                    reviewed_at: time::now(),
                },
            )
            .await
            .unwrap();

        let for_owner = list(&storage, student(7), a.id).await.unwrap();
        assert_eq!(for_owner.items.len(), 1);
        assert_eq!(for_owner.items[0].decision, AuditDecision::Approved);
        assert_eq!(for_owner.items[0].score_or_reason, "95");

        let for_teacher = list(&storage, teacher(4), a.id).await.unwrap();
        assert_eq!(for_teacher.items, for_owner.items);

        let err = list(&storage, student(8), a.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_pending_has_empty_trail() {
        let storage = MemoryStorage::new();
        let a = create(&storage, student(7), request("专利授权")).await.unwrap();
        assert!(list(&storage, student(7), a.id).await.unwrap().items.is_empty());
    }
}
