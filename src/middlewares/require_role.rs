/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用，用于验证调用方是否具有特定角色。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use crate::middlewares::{RequireJWT, RequireRole};
 * use crate::models::users::entities::UserRole;
 *
 * web::scope("/api/v1/achievements")
 *     .wrap(RequireJWT)
 *     .route(
 *         "/{id}/review",
 *         web::post()
 *             .to(submit_review)
 *             .wrap(RequireRole::new_any(UserRole::reviewer_roles())),
 *     )
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use super::create_error_response;
use crate::{
    middlewares::RequireJWT,
    models::{ErrorCode, users::entities::UserRole},
};

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[UserRole]) -> Self {
        Self {
            required_roles: roles.to_vec(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let required_roles = self.required_roles.clone();

        Box::pin(async move {
            match RequireJWT::extract_caller(req.request()) {
                Some(caller) if required_roles.contains(&caller.role) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some(caller) => {
                    info!(
                        "Access denied for user {} (role: {}). Required roles: {:?}",
                        caller.id, caller.role, required_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Access denied.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!(
                        "Role check failed: No caller found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::Caller;
    use actix_web::{HttpMessage, test};

    #[actix_web::test]
    async fn test_only_listed_roles_pass() {
        let srv = RequireRole::new_any(UserRole::reviewer_roles())
            .new_transform(test::ok_service())
            .await
            .unwrap();

        for (role, expected) in [
            (UserRole::Teacher, StatusCode::OK),
            (UserRole::Admin, StatusCode::OK),
            (UserRole::Student, StatusCode::FORBIDDEN),
        ] {
            let req = test::TestRequest::post().to_srv_request();
            req.extensions_mut().insert(Caller::new(1, role));
            let resp = srv.call(req).await.unwrap();
            assert_eq!(resp.status(), expected, "role {role}");
        }

        let req = test::TestRequest::post().to_srv_request();
        let resp = srv.call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
