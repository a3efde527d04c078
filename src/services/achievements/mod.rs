pub mod audits;
pub mod create;
pub mod detail;
pub mod list;
pub mod resubmit;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{ErrorKind, PortalError, Result};
use crate::models::ErrorCode;
use crate::models::achievements::{
    entities::Achievement,
    requests::{AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest},
};
use crate::models::users::entities::Caller;
use crate::storage::Storage;

pub struct AchievementService;

impl AchievementService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
            .expect("Storage not found in app data")
            .get_ref()
            .clone()
    }

    pub async fn create_achievement(
        &self,
        request: &HttpRequest,
        req: CreateAchievementRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_achievement(self, request, req).await
    }

    pub async fn get_achievement(
        &self,
        request: &HttpRequest,
        achievement_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_achievement(self, request, achievement_id).await
    }

    pub async fn list_achievements(
        &self,
        request: &HttpRequest,
        query: AchievementListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_achievements(self, request, query).await
    }

    pub async fn update_achievement(
        &self,
        request: &HttpRequest,
        achievement_id: i64,
        req: UpdateAchievementRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_achievement(self, request, achievement_id, req).await
    }

    pub async fn resubmit_achievement(
        &self,
        request: &HttpRequest,
        achievement_id: i64,
        req: CreateAchievementRequest,
    ) -> ActixResult<HttpResponse> {
        resubmit::resubmit_achievement(self, request, achievement_id, req).await
    }

    pub async fn list_audits(
        &self,
        request: &HttpRequest,
        achievement_id: i64,
    ) -> ActixResult<HttpResponse> {
        audits::list_audits(self, request, achievement_id).await
    }
}

/// 提交者本人、教师和管理员可以查看成果
pub(crate) fn ensure_can_view(caller: &Caller, achievement: &Achievement) -> Result<()> {
    if caller.is_reviewer() || achievement.owner_id == caller.id {
        Ok(())
    } else {
        Err(PortalError::forbidden(format!(
            "无权查看成果 {}",
            achievement.id
        )))
    }
}

/// 成果接口的错误码，`conflict` 为该操作冲突时使用的错误码
pub(crate) fn error_code(err: &PortalError, conflict: ErrorCode) -> ErrorCode {
    match err.kind() {
        ErrorKind::NotFound => ErrorCode::AchievementNotFound,
        ErrorKind::Conflict => conflict,
        kind => ErrorCode::from_kind(kind),
    }
}
