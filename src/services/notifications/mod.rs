//! 审核结果通知
//!
//! 审核引擎只依赖 [`NotificationEmitter`]，投递失败不会影响已提交的审核。

pub mod hub;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::notifications::entities::ReviewNotification;

pub use hub::NotificationHub;

#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    /// 发出通知（至多一次）
    async fn emit(&self, notification: ReviewNotification) -> Result<()>;
}
