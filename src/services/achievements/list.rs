use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AchievementService, error_code};
use crate::errors::{PortalError, Result};
use crate::models::achievements::{
    requests::AchievementListQuery, responses::AchievementListResponse,
};
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{failure, require_caller};
use crate::storage::Storage;

/// 列出成果：学生只能看到自己的成果，审核人可以按学生和状态筛选
pub async fn list(
    storage: &dyn Storage,
    caller: Caller,
    mut query: AchievementListQuery,
) -> Result<AchievementListResponse> {
    if !caller.is_reviewer() {
        match query.owner_id {
            Some(owner_id) if owner_id != caller.id => {
                return Err(PortalError::forbidden("学生只能查看自己的成果"));
            }
            _ => query.owner_id = Some(caller.id),
        }
    }
    storage.list_achievements_with_pagination(query).await
}

pub async fn list_achievements(
    service: &AchievementService,
    request: &HttpRequest,
    query: AchievementListQuery,
) -> ActixResult<HttpResponse> {
    let caller = match require_caller(request) {
        Ok(caller) => caller,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match list(storage.as_ref(), caller, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取成功"))),
        Err(e) => Ok(failure(&e, error_code(&e, ErrorCode::BadRequest))),
    }
}
