pub mod engine;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::reviews::requests::ReviewRequest;
use crate::services::notifications::NotificationEmitter;
use crate::storage::Storage;

pub use engine::ReviewEngine;

/// 审核接口服务，存储和通知发送方从 app_data 中获取
pub struct ReviewService;

impl ReviewService {
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

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> ReviewEngine {
        let emitter = request
            .app_data::<actix_web::web::Data<Arc<dyn NotificationEmitter>>>()
            .expect("Notification emitter not found in app data")
            .get_ref()
            .clone();
        ReviewEngine::new(self.get_storage(request), emitter)
    }

    pub async fn submit_review(
        &self,
        request: &HttpRequest,
        achievement_id: i64,
        req: ReviewRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_review(self, request, achievement_id, req).await
    }
}
