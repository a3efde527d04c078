use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::PortalError;
use crate::models::achievements::entities::{Achievement, AchievementStatus};

/// 审核决定（请求输入）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl std::str::FromStr for ReviewDecision {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ReviewDecision::Approve),
            "reject" => Ok(ReviewDecision::Reject),
            _ => Err(PortalError::invalid_argument(format!(
                "无效的审核决定: '{s}'. 支持: approve, reject"
            ))),
        }
    }
}

/// 已作出的审核结论（审核记录与通知中使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub enum AuditDecision {
    Approved,
    Rejected,
}

impl AuditDecision {
    pub fn status(&self) -> AchievementStatus {
        match self {
            AuditDecision::Approved => AchievementStatus::Approved,
            AuditDecision::Rejected => AchievementStatus::Rejected,
        }
    }
}

impl std::fmt::Display for AuditDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status().as_str())
    }
}

impl std::str::FromStr for AuditDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<AchievementStatus>()? {
            AchievementStatus::Approved => Ok(AuditDecision::Approved),
            AchievementStatus::Rejected => Ok(AuditDecision::Rejected),
            AchievementStatus::Pending => Err(format!("Invalid audit decision: {s}")),
        }
    }
}

/// 校验通过的审核结论：分数与驳回理由互斥
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewVerdict {
    Approved { score: i32 },
    Rejected { reason: String },
}

impl ReviewVerdict {
    pub fn decision(&self) -> AuditDecision {
        match self {
            ReviewVerdict::Approved { .. } => AuditDecision::Approved,
            ReviewVerdict::Rejected { .. } => AuditDecision::Rejected,
        }
    }

    pub fn status(&self) -> AchievementStatus {
        self.decision().status()
    }

    pub fn score(&self) -> Option<i32> {
        match self {
            ReviewVerdict::Approved { score } => Some(*score),
            ReviewVerdict::Rejected { .. } => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&str> {
        match self {
            ReviewVerdict::Approved { .. } => None,
            ReviewVerdict::Rejected { reason } => Some(reason),
        }
    }

    /// 审核记录和通知里的 score_or_reason 字段
    pub fn score_or_reason(&self) -> String {
        match self {
            ReviewVerdict::Approved { score } => score.to_string(),
            ReviewVerdict::Rejected { reason } => reason.clone(),
        }
    }
}

/// 一次状态迁移：Pending → Approved / Rejected
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewTransition {
    pub verdict: ReviewVerdict,
    pub reviewer_id: i64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewTransition {
    /// 计算迁移后的成果记录
    pub fn apply(&self, achievement: &Achievement) -> Achievement {
        Achievement {
            status: self.verdict.status(),
            score: self.verdict.score(),
            reject_reason: self.verdict.reject_reason().map(str::to_string),
            reviewer_id: Some(self.reviewer_id),
            reviewed_at: Some(self.reviewed_at),
            updated_at: self.reviewed_at,
            ..achievement.clone()
        }
    }

    /// 与本次迁移一同写入的审核记录
    pub fn audit_record(&self, achievement_id: i64) -> NewAuditRecord {
        NewAuditRecord {
            achievement_id,
            reviewer_id: self.reviewer_id,
            decision: self.verdict.decision(),
            score_or_reason: self.verdict.score_or_reason(),
            decided_at: self.reviewed_at,
        }
    }
}

/// 待追加的审核记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    pub achievement_id: i64,
    pub reviewer_id: i64,
    pub decision: AuditDecision,
    pub score_or_reason: String,
    pub decided_at: DateTime<Utc>,
}

// 审核记录实体（只追加，不修改、不删除）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct AuditRecord {
    pub id: i64,
    pub achievement_id: i64,
    pub reviewer_id: i64,
    pub decision: AuditDecision,
    pub score_or_reason: String,
    pub decided_at: DateTime<Utc>,
}

impl NewAuditRecord {
    pub fn with_id(self, id: i64) -> AuditRecord {
        AuditRecord {
            id,
            achievement_id: self.achievement_id,
            reviewer_id: self.reviewer_id,
            decision: self.decision,
            score_or_reason: self.score_or_reason,
            decided_at: self.decided_at,
        }
    }
}

/// 原子提交的结果：迁移后的成果与新追加的审核记录
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCommit {
    pub achievement: Achievement,
    pub audit: AuditRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parse() {
        assert_eq!(
            "approve".parse::<ReviewDecision>(),
            Ok(ReviewDecision::Approve)
        );
        assert_eq!(
            "reject".parse::<ReviewDecision>(),
            Ok(ReviewDecision::Reject)
        );
        let err = "maybe".parse::<ReviewDecision>().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_audit_decision_rejects_pending() {
        assert_eq!("approved".parse(), Ok(AuditDecision::Approved));
        assert!("pending".parse::<AuditDecision>().is_err());
    }

    #[test]
    fn test_verdict_fields_are_exclusive() {
        let approved = ReviewVerdict::Approved { score: 85 };
        assert_eq!(approved.score(), Some(85));
        assert_eq!(approved.reject_reason(), None);
        assert_eq!(approved.score_or_reason(), "85");

        let rejected = ReviewVerdict::Rejected {
            reason: "insufficient detail".into(),
        };
        assert_eq!(rejected.score(), None);
        assert_eq!(rejected.reject_reason(), Some("insufficient detail"));
        assert_eq!(rejected.status(), AchievementStatus::Rejected);
    }
}
