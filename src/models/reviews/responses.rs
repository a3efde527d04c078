use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::AuditRecord;
use crate::models::achievements::entities::AchievementStatus;

/// 审核结果
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewResult {
    pub achievement_id: i64,
    pub status: AchievementStatus,
    pub score: Option<i32>,
    pub reject_reason: Option<String>,
    pub reviewer_id: i64,
    pub reviewed_at: DateTime<Utc>,
    pub audit_id: i64,
}

/// 审核记录列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct AuditListResponse {
    pub items: Vec<AuditRecord>,
}
