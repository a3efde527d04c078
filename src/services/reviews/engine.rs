//! 成果审核引擎
//!
//! 处理顺序：
//! 1. 校验角色、审核决定和载荷（纯内存计算，失败时不做任何 I/O）
//! 2. 读取成果，不存在返回 `NotFound`，非待审核返回 `Conflict`
//! 3. 通过 [`Storage::commit_review`] 原子地条件写入状态并追加审核记录，
//!    并发审核中只有一个能通过 `status = pending` 条件
//! 4. 提交成功后发出通知，失败只记录警告

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{ErrorKind, PortalError, Result};
use crate::models::{
    achievements::entities::AchievementStatus,
    notifications::entities::ReviewNotification,
    reviews::{
        entities::{ReviewDecision, ReviewTransition, ReviewVerdict},
        requests::ReviewPayload,
        responses::ReviewResult,
    },
    users::entities::UserRole,
};
use crate::services::notifications::NotificationEmitter;
use crate::storage::{Storage, conflict_for};
use crate::utils::{time, validate};

pub struct ReviewEngine {
    storage: Arc<dyn Storage>,
    emitter: Arc<dyn NotificationEmitter>,
}

/// 校验审核请求，返回审核结论
pub fn validate_review(
    reviewer_role: UserRole,
    decision: &str,
    payload: &ReviewPayload,
) -> Result<ReviewVerdict> {
    if !reviewer_role.is_reviewer() {
        return Err(PortalError::forbidden(format!(
            "角色 {reviewer_role} 无权审核成果"
        )));
    }

    match decision.parse::<ReviewDecision>()? {
        ReviewDecision::Approve => {
            let score =
                validate::validate_score(payload.score.as_ref()).map_err(PortalError::validation)?;
            Ok(ReviewVerdict::Approved { score })
        }
        ReviewDecision::Reject => {
            let reason = validate::validate_reject_reason(payload.reject_reason.as_deref())
                .map_err(PortalError::validation)?;
            Ok(ReviewVerdict::Rejected { reason })
        }
    }
}

impl ReviewEngine {
    pub fn new(storage: Arc<dyn Storage>, emitter: Arc<dyn NotificationEmitter>) -> Self {
        Self { storage, emitter }
    }

    pub async fn submit_review(
        &self,
        achievement_id: i64,
        reviewer_id: i64,
        reviewer_role: UserRole,
        decision: &str,
        payload: ReviewPayload,
    ) -> Result<ReviewResult> {
        let verdict = validate_review(reviewer_role, decision, &payload)?;

        let achievement = self
            .storage
            .get_achievement_by_id(achievement_id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("成果不存在: {achievement_id}")))?;

        if !achievement.is_pending() {
            return Err(conflict_for(
                achievement_id,
                AchievementStatus::Pending,
                achievement.status,
            ));
        }

        // 审核时间不早于创建时间
        let transition = ReviewTransition {
            verdict,
            reviewer_id,
            reviewed_at: time::now().max(achievement.created_at),
        };

        let commit = self
            .storage
            .commit_review(achievement_id, AchievementStatus::Pending, transition)
            .await
            .inspect_err(|e| {
                if e.kind() == ErrorKind::Conflict {
                    warn!(
                        "Review by {} on achievement {} lost the race: {}",
                        reviewer_id,
                        achievement_id,
                        e.message()
                    );
                }
            })?;

        let updated = commit.achievement;
        let audit = commit.audit;

        info!(
            "Achievement {} {} by reviewer {} (audit {})",
            achievement_id, audit.decision, reviewer_id, audit.id
        );

        let notification = ReviewNotification {
            achievement_id,
            owner_id: updated.owner_id,
            decision: audit.decision,
            score_or_reason: audit.score_or_reason.clone(),
            decided_at: audit.decided_at,
        };
        if let Err(e) = self.emitter.emit(notification).await {
            warn!(
                "Failed to emit review notification for achievement {}: {}",
                achievement_id, e
            );
        }

        Ok(ReviewResult {
            achievement_id,
            status: updated.status,
            score: updated.score,
            reject_reason: updated.reject_reason,
            reviewer_id,
            reviewed_at: audit.decided_at,
            audit_id: audit.id,
        })
    }
}
