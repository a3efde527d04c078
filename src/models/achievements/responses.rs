use serde::Serialize;
use ts_rs::TS;

use super::entities::Achievement;
use crate::models::PaginationInfo;

/// 成果列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub struct AchievementListResponse {
    pub items: Vec<Achievement>,
    pub pagination: PaginationInfo,
}
