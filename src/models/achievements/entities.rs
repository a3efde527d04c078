use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成果审核状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub enum AchievementStatus {
    Pending,  // 待审核
    Approved, // 已通过
    Rejected, // 已驳回
}

impl AchievementStatus {
    pub const PENDING: &'static str = "pending";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementStatus::Pending => Self::PENDING,
            AchievementStatus::Approved => Self::APPROVED,
            AchievementStatus::Rejected => Self::REJECTED,
        }
    }

    /// 终态：同一个提交实例不会再离开该状态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AchievementStatus::Pending)
    }
}

impl<'de> Deserialize<'de> for AchievementStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的成果状态: '{s}'. 支持的状态: pending, approved, rejected"
            ))
        })
    }
}

impl std::fmt::Display for AchievementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AchievementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING => Ok(AchievementStatus::Pending),
            Self::APPROVED => Ok(AchievementStatus::Approved),
            Self::REJECTED => Ok(AchievementStatus::Rejected),
            _ => Err(format!("Invalid achievement status: {s}")),
        }
    }
}

// 成果实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/achievement.ts")]
pub struct Achievement {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub attachments: Vec<String>,
    pub status: AchievementStatus,
    pub score: Option<i32>,
    pub reject_reason: Option<String>,
    pub reviewer_id: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// 被驳回后重新提交时指向上一个实例
    pub previous_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Achievement {
    pub fn is_pending(&self) -> bool {
        self.status == AchievementStatus::Pending
    }

    /// 状态与审核字段是否一致
    ///
    /// - Pending：审核人、审核时间、分数、驳回理由全部为空
    /// - Approved：有分数和审核信息，没有驳回理由
    /// - Rejected：有非空驳回理由和审核信息，没有分数
    pub fn is_consistent(&self) -> bool {
        let reviewed = self.reviewer_id.is_some() && self.reviewed_at.is_some();
        let has_reason = self.reject_reason.as_deref().is_some_and(|r| !r.is_empty());
        match self.status {
            AchievementStatus::Pending => {
                self.reviewer_id.is_none()
                    && self.reviewed_at.is_none()
                    && self.score.is_none()
                    && self.reject_reason.is_none()
            }
            AchievementStatus::Approved => {
                reviewed && self.score.is_some() && self.reject_reason.is_none()
            }
            AchievementStatus::Rejected => reviewed && has_reason && self.score.is_none(),
        }
    }
}
