/*!
 * 速率限制中间件
 *
 * 限制单个调用方在时间窗口内的请求次数，用于审核提交接口。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use crate::middlewares::RateLimit;
 *
 * web::post()
 *     .to(submit_review)
 *     .wrap(RateLimit::review())
 * ```
 *
 * ## 限制规则
 *
 * - 已认证请求以调用方 ID 作为限制键，否则使用客户端 IP
 * - 固定窗口：窗口从该键的第一个请求开始计时，期间的后续请求不会延长窗口
 * - 超过限制返回 429 Too Many Requests，`Retry-After` 为窗口剩余秒数
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;
use crate::models::users::entities::Caller;
use crate::models::{ApiResponse, ErrorCode};

const MAX_TRACKED_KEYS: u64 = 100_000;

/// 单个限制键的当前窗口
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started: Instant,
}

impl RateWindow {
    fn open(now: Instant) -> Self {
        Self {
            count: 1,
            started: now,
        }
    }

    // 窗口内累加，窗口结束后从当前请求重新开始
    fn hit(previous: Option<Self>, now: Instant, window: Duration) -> Self {
        match previous {
            Some(w) if now.duration_since(w.started) < window => Self {
                count: w.count.saturating_add(1),
                started: w.started,
            },
            _ => Self::open(now),
        }
    }

    fn retry_after(&self, now: Instant, window: Duration) -> u64 {
        let elapsed = now.duration_since(self.started);
        window.saturating_sub(elapsed).as_secs_f64().ceil().max(1.0) as u64
    }
}

/// 速率限制配置
///
/// 计数缓存随实例克隆共享，所有工作线程使用同一份计数。
#[derive(Clone)]
pub struct RateLimit {
    /// 时间窗口内允许的最大请求数
    max_requests: u32,
    /// 时间窗口（秒）
    window_secs: u64,
    /// 限制键前缀（用于区分不同端点）
    key_prefix: String,
    /// 键: 前缀:调用方，值: 当前窗口；TTL 只负责清理空闲的键
    counters: Cache<String, RateWindow>,
}

impl RateLimit {
    /// 创建新的速率限制器
    ///
    /// # 参数
    /// - `max_requests`: 时间窗口内允许的最大请求数
    /// - `window_secs`: 时间窗口（秒）
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
            key_prefix: String::new(),
            counters: Cache::builder()
                .time_to_live(Duration::from_secs(window_secs.max(1)))
                .max_capacity(MAX_TRACKED_KEYS)
                .build(),
        }
    }

    /// 设置限制键前缀
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 审核提交限制：按配置的次数/窗口/审核人
    pub fn review() -> Self {
        let config = &AppConfig::get().review;
        Self::new(config.max_requests, config.window_secs).with_prefix("review")
    }
}

// 限制键：已认证时为调用方 ID，否则为连接的远端地址
fn limit_identifier(req: &ServiceRequest) -> String {
    if let Some(caller) = req.extensions().get::<Caller>() {
        return format!("user:{}", caller.id);
    }
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    format!("ip:{ip}")
}

/// 创建速率限制错误响应
fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "请求过于频繁，请稍后再试",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            max_requests: self.max_requests,
            window_secs: self.window_secs,
            key_prefix: self.key_prefix.clone(),
            counters: self.counters.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
    counters: Cache<String, RateWindow>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let max_requests = self.max_requests;
        let window_secs = self.window_secs;
        let key_prefix = self.key_prefix.clone();
        let counters = self.counters.clone();

        Box::pin(async move {
            // 构建限制键
            let identifier = limit_identifier(&req);

            let cache_key = if key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", key_prefix, identifier)
            };

            // 同一个键的读取与累加在缓存内原子完成
            let now = Instant::now();
            let window = Duration::from_secs(window_secs.max(1));
            let current = counters
                .entry(cache_key.clone())
                .and_upsert_with(|previous| {
                    let previous = previous.map(|entry| entry.into_value());
                    std::future::ready(RateWindow::hit(previous, now, window))
                })
                .await
                .into_value();

            // 检查是否超过限制
            if current.count > max_requests {
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, current.count, max_requests
                );
                let retry_after = current.retry_after(now, window);
                return Ok(req
                    .into_response(create_rate_limit_response(retry_after).map_into_right_body()));
            }

            let remaining = max_requests.saturating_sub(current.count);
            let mut res = srv.call(req).await?.map_into_left_body();

            // 添加速率限制头
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(max_requests),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_from(caller_id: i64) -> ServiceRequest {
        let req = actix_web::test::TestRequest::post().to_srv_request();
        req.extensions_mut()
            .insert(Caller::new(caller_id, crate::models::users::entities::UserRole::Teacher));
        req
    }

    #[test]
    fn test_review_preset_uses_config() {
        let review = RateLimit::review();
        let config = &AppConfig::get().review;
        assert_eq!(review.max_requests, config.max_requests);
        assert_eq!(review.window_secs, config.window_secs);
        assert_eq!(review.key_prefix, "review");
    }

    #[actix_web::test]
    async fn test_limit_is_per_caller() {
        let srv = RateLimit::new(2, 60)
            .with_prefix("test")
            .new_transform(actix_web::test::ok_service())
            .await
            .unwrap();

        for remaining in ["1", "0"] {
            let resp = srv.call(request_from(1)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().get("x-ratelimit-remaining").unwrap(),
                remaining
            );
        }
        let resp = srv.call(request_from(1)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "60");

        let resp = srv.call(request_from(2)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_window_is_not_extended_by_later_requests() {
        let srv = RateLimit::new(2, 2)
            .new_transform(actix_web::test::ok_service())
            .await
            .unwrap();

        let resp = srv.call(request_from(1)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        actix_web::rt::time::sleep(Duration::from_millis(1200)).await;
        let resp = srv.call(request_from(1)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // 第一个请求开始的窗口已经结束，计数重新开始
        actix_web::rt::time::sleep(Duration::from_millis(1000)).await;
        let resp = srv.call(request_from(1)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "1");
    }

    #[test]
    fn test_window_counts_until_expiry() {
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let first = RateWindow::hit(None, start, window);
        assert_eq!(first.count, 1);

        let second = RateWindow::hit(Some(first), start + Duration::from_secs(59), window);
        assert_eq!(second.count, 2);
        assert_eq!(second.started, start);
        assert_eq!(second.retry_after(start + Duration::from_secs(59), window), 1);

        let reopened = RateWindow::hit(Some(second), start + Duration::from_secs(60), window);
        assert_eq!(reopened.count, 1);
        assert_eq!(reopened.started, start + Duration::from_secs(60));
    }
}
