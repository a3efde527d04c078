//! 审核记录存储操作（只追加）

use super::SeaOrmStorage;
use crate::entity::review_audits::{ActiveModel, Column, Entity as ReviewAudits};
use crate::errors::{PortalError, Result};
use crate::models::reviews::entities::{AuditRecord, NewAuditRecord};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

/// 追加审核记录，可在事务内使用
pub(super) async fn append_audit_on<C: ConnectionTrait>(
    conn: &C,
    record: NewAuditRecord,
) -> Result<i64> {
    let model = ActiveModel {
        achievement_id: Set(record.achievement_id),
        reviewer_id: Set(record.reviewer_id),
        decision: Set(record.decision.to_string()),
        score_or_reason: Set(record.score_or_reason),
        decided_at: Set(record.decided_at.timestamp()),
        ..Default::default()
    };

    let result = model
        .insert(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("写入审核记录失败: {e}")))?;

    Ok(result.id)
}

impl SeaOrmStorage {
    /// 列出成果的审核记录
    pub async fn list_audits_by_achievement_impl(
        &self,
        achievement_id: i64,
    ) -> Result<Vec<AuditRecord>> {
        ReviewAudits::find()
            .filter(Column::AchievementId.eq(achievement_id))
            .order_by_asc(Column::DecidedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询审核记录失败: {e}")))?
            .into_iter()
            .map(|m| m.into_audit())
            .collect()
    }
}
