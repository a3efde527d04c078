//! 内存存储实现
//!
//! 用于开发环境（`database.url = "memory://"`）和测试。成果与审核记录放在同一把
//! 写锁之下，条件写入和追加审核记录在持锁期间一次完成。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AchievementStore, AuditTrail, Storage, conflict_for};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    achievements::{
        entities::{Achievement, AchievementStatus},
        requests::{AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest},
        responses::AchievementListResponse,
    },
    common::pagination::normalize_page,
    reviews::entities::{AuditRecord, NewAuditRecord, ReviewCommit, ReviewTransition},
};
use crate::utils::time;

pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Default)]
struct MemoryState {
    achievements: BTreeMap<i64, Achievement>,
    audits: Vec<AuditRecord>,
    last_achievement_id: i64,
    last_audit_id: i64,
}

impl MemoryState {
    // 计算条件写入后的记录，不修改状态
    fn stage_swap(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: &ReviewTransition,
    ) -> Result<Achievement> {
        let current = self
            .achievements
            .get(&id)
            .ok_or_else(|| PortalError::not_found(format!("成果不存在: {id}")))?;
        if current.status != expected {
            return Err(conflict_for(id, expected, current.status));
        }
        Ok(transition.apply(current))
    }

    fn swap_status(
        &mut self,
        id: i64,
        expected: AchievementStatus,
        transition: &ReviewTransition,
    ) -> Result<Achievement> {
        let updated = self.stage_swap(id, expected, transition)?;
        self.achievements.insert(id, updated.clone());
        Ok(updated)
    }

    fn append(&mut self, record: NewAuditRecord) -> Result<i64> {
        if !self.achievements.contains_key(&record.achievement_id) {
            return Err(PortalError::not_found(format!(
                "成果不存在: {}",
                record.achievement_id
            )));
        }
        let id = self
            .last_audit_id
            .checked_add(1)
            .ok_or_else(|| PortalError::database_operation("审核记录 ID 已耗尽".to_string()))?;
        self.last_audit_id = id;
        self.audits.push(record.with_id(id));
        Ok(id)
    }
}

pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AchievementStore for MemoryStorage {
    async fn create_achievement(
        &self,
        owner_id: i64,
        req: CreateAchievementRequest,
        previous_id: Option<i64>,
    ) -> Result<Achievement> {
        let mut state = self.state.write().await;

        if let Some(prev) = previous_id
            && state
                .achievements
                .values()
                .any(|a| a.previous_id == Some(prev))
        {
            return Err(PortalError::conflict(format!("成果 {prev} 已经重新提交过")));
        }

        state.last_achievement_id += 1;
        let now = time::now();
        let achievement = Achievement {
            id: state.last_achievement_id,
            owner_id,
            title: req.title,
            content: req.content,
            attachments: req.attachments,
            status: AchievementStatus::Pending,
            score: None,
            reject_reason: None,
            reviewer_id: None,
            reviewed_at: None,
            previous_id,
            created_at: now,
            updated_at: now,
        };
        state
            .achievements
            .insert(achievement.id, achievement.clone());
        Ok(achievement)
    }

    async fn get_achievement_by_id(&self, id: i64) -> Result<Option<Achievement>> {
        Ok(self.state.read().await.achievements.get(&id).cloned())
    }

    async fn get_achievement_by_previous_id(
        &self,
        previous_id: i64,
    ) -> Result<Option<Achievement>> {
        let state = self.state.read().await;
        Ok(state
            .achievements
            .values()
            .find(|a| a.previous_id == Some(previous_id))
            .cloned())
    }

    async fn list_achievements_with_pagination(
        &self,
        query: AchievementListQuery,
    ) -> Result<AchievementListResponse> {
        let (page, size) = normalize_page(query.page, query.size);
        let state = self.state.read().await;

        // ID 单调递增，倒序即为最新优先
        let matched: Vec<&Achievement> = state
            .achievements
            .values()
            .rev()
            .filter(|a| query.status.is_none_or(|s| a.status == s))
            .filter(|a| query.owner_id.is_none_or(|o| a.owner_id == o))
            .collect();

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();

        Ok(AchievementListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    async fn update_pending_achievement(
        &self,
        id: i64,
        owner_id: i64,
        update: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>> {
        let mut state = self.state.write().await;
        let Some(current) = state.achievements.get_mut(&id) else {
            return Ok(None);
        };
        if current.owner_id != owner_id || !current.is_pending() {
            return Ok(None);
        }

        if let Some(title) = update.title {
            current.title = title;
        }
        if let Some(content) = update.content {
            current.content = content;
        }
        if let Some(attachments) = update.attachments {
            current.attachments = attachments;
        }
        current.updated_at = time::now();
        Ok(Some(current.clone()))
    }

    async fn compare_and_swap_status(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: &ReviewTransition,
    ) -> Result<Achievement> {
        self.state
            .write()
            .await
            .swap_status(id, expected, transition)
    }
}

#[async_trait]
impl AuditTrail for MemoryStorage {
    async fn append_audit(&self, record: NewAuditRecord) -> Result<i64> {
        self.state.write().await.append(record)
    }

    async fn list_audits_by_achievement(&self, achievement_id: i64) -> Result<Vec<AuditRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<AuditRecord> = state
            .audits
            .iter()
            .filter(|r| r.achievement_id == achievement_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.decided_at, r.id));
        Ok(records)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn commit_review(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: ReviewTransition,
    ) -> Result<ReviewCommit> {
        let mut state = self.state.write().await;
        // 审核记录写入成功后才落地状态变更
        let achievement = state.stage_swap(id, expected, &transition)?;
        let record = transition.audit_record(id);
        let audit_id = state.append(record.clone())?;
        state.achievements.insert(id, achievement.clone());
        Ok(ReviewCommit {
            achievement,
            audit: record.with_id(audit_id),
        })
    }
}
