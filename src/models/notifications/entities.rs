use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::reviews::entities::AuditDecision;

/// 审核结果通知事件
///
/// 审核提交成功后发出，投递方式由通知发送方决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct ReviewNotification {
    pub achievement_id: i64,
    pub owner_id: i64,
    pub decision: AuditDecision,
    pub score_or_reason: String,
    pub decided_at: DateTime<Utc>,
}
