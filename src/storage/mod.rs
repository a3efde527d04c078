//! 数据存储层
//!
//! - [`AchievementStore`]：成果记录，状态迁移只能通过条件写入完成
//! - [`AuditTrail`]：审核记录，只追加
//! - [`Storage`]：组合两者，并提供把状态迁移和审核记录放在同一原子单元中的提交

use std::sync::Arc;

use crate::errors::{PortalError, Result};
use crate::models::{
    achievements::{
        entities::{Achievement, AchievementStatus},
        requests::{AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest},
        responses::AchievementListResponse,
    },
    reviews::entities::{AuditRecord, NewAuditRecord, ReviewCommit, ReviewTransition},
};

pub mod memory;
pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait AchievementStore: Send + Sync {
    // 创建成果（状态为 Pending），previous_id 指向被驳回的上一个实例
    async fn create_achievement(
        &self,
        owner_id: i64,
        req: CreateAchievementRequest,
        previous_id: Option<i64>,
    ) -> Result<Achievement>;
    // 通过ID获取成果
    async fn get_achievement_by_id(&self, id: i64) -> Result<Option<Achievement>>;
    // 获取某个实例的重新提交
    async fn get_achievement_by_previous_id(&self, previous_id: i64)
    -> Result<Option<Achievement>>;
    // 列出成果
    async fn list_achievements_with_pagination(
        &self,
        query: AchievementListQuery,
    ) -> Result<AchievementListResponse>;
    // 提交者修改待审核成果，条件不满足（已审核或非本人）时返回 None
    async fn update_pending_achievement(
        &self,
        id: i64,
        owner_id: i64,
        update: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>>;
    /// 条件写入：仅当当前状态等于 `expected` 时应用迁移
    ///
    /// 不存在返回 `NotFound`，状态不符返回 `Conflict`。
    async fn compare_and_swap_status(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: &ReviewTransition,
    ) -> Result<Achievement>;
}

#[async_trait::async_trait]
pub trait AuditTrail: Send + Sync {
    // 追加审核记录，返回记录ID
    async fn append_audit(&self, record: NewAuditRecord) -> Result<i64>;
    // 按 decided_at、id 顺序列出某个成果的审核记录
    async fn list_audits_by_achievement(&self, achievement_id: i64) -> Result<Vec<AuditRecord>>;
}

#[async_trait::async_trait]
pub trait Storage: AchievementStore + AuditTrail {
    /// 原子提交审核：条件写入成果状态并追加一条审核记录，两者要么都可见，要么都不可见
    async fn commit_review(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: ReviewTransition,
    ) -> Result<ReviewCommit>;
}

pub(crate) fn conflict_for(
    id: i64,
    expected: AchievementStatus,
    current: AchievementStatus,
) -> PortalError {
    PortalError::conflict(format!("成果 {id} 当前状态为 {current}，期望 {expected}"))
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = crate::config::AppConfig::get();
    if config.database.url.starts_with(memory::MEMORY_URL_SCHEME) {
        return Ok(Arc::new(memory::MemoryStorage::new()));
    }
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
