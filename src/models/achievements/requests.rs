use serde::Deserialize;
use ts_rs::TS;

use super::entities::AchievementStatus;

// 创建成果请求（也用于驳回后重新提交）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub struct CreateAchievementRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

// 更新成果请求（仅待审核状态下由提交者本人修改）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub struct UpdateAchievementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub attachments: Option<Vec<String>>,
}

impl UpdateAchievementRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.attachments.is_none()
    }
}

// 成果列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub struct AchievementListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub status: Option<AchievementStatus>,
    pub owner_id: Option<i64>,
}
