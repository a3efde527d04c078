use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::achievements::requests::{
    AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest,
};
use crate::models::reviews::requests::ReviewRequest;
use crate::models::users::entities::UserRole;
use crate::services::{AchievementService, ReviewService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static ACHIEVEMENT_SERVICE: Lazy<AchievementService> = Lazy::new(AchievementService::new_lazy);
static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

// 所有工作线程共享同一份审核限流计数
static REVIEW_RATE_LIMIT: Lazy<RateLimit> = Lazy::new(RateLimit::review);

// 列出成果
pub async fn list_achievements(
    req: HttpRequest,
    query: web::Query<AchievementListQuery>,
) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE
        .list_achievements(&req, query.into_inner())
        .await
}

// 提交成果
pub async fn create_achievement(
    req: HttpRequest,
    body: web::Json<CreateAchievementRequest>,
) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE
        .create_achievement(&req, body.into_inner())
        .await
}

// 获取成果详情
pub async fn get_achievement(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE.get_achievement(&req, path.0).await
}

// 修改待审核成果
pub async fn update_achievement(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateAchievementRequest>,
) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE
        .update_achievement(&req, path.0, body.into_inner())
        .await
}

// 驳回后重新提交
pub async fn resubmit_achievement(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<CreateAchievementRequest>,
) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE
        .resubmit_achievement(&req, path.0, body.into_inner())
        .await
}

// 审核记录
pub async fn list_audits(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ACHIEVEMENT_SERVICE.list_audits(&req, path.0).await
}

// 提交审核决定
pub async fn submit_review(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<ReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .submit_review(&req, path.0, body.into_inner())
        .await
}

// 配置路由
pub fn configure_achievement_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/achievements")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 列出成果 - 业务层按角色过滤
                    .route(web::get().to(list_achievements))
                    // 提交成果 - 业务层只允许学生
                    .route(web::post().to(create_achievement)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_achievement))
                    .route(web::put().to(update_achievement)),
            )
            .service(web::resource("/{id}/resubmit").route(web::post().to(resubmit_achievement)))
            .service(web::resource("/{id}/audits").route(web::get().to(list_audits)))
            // 审核 - 仅教师和管理员，先校验角色再计入限流
            .service(
                web::resource("/{id}/review").route(
                    web::post()
                        .to(submit_review)
                        .wrap(REVIEW_RATE_LIMIT.clone())
                        .wrap(middlewares::RequireRole::new_any(UserRole::reviewer_roles())),
                ),
            ),
    );
}
