//! 成果实体

use sea_orm::entity::prelude::*;

use crate::errors::PortalError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub attachments: Option<String>,
    pub status: String,
    pub score: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub reject_reason: Option<String>,
    pub reviewer_id: Option<i64>,
    pub reviewed_at: Option<i64>,
    #[sea_orm(unique)]
    pub previous_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review_audits::Entity")]
    ReviewAudits,
}

impl Related<super::review_audits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewAudits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_achievement(
        self,
    ) -> crate::errors::Result<crate::models::achievements::entities::Achievement> {
        use crate::models::achievements::entities::{Achievement, AchievementStatus};
        use chrono::{DateTime, Utc};

        let status = self.status.parse::<AchievementStatus>().map_err(|e| {
            PortalError::database_operation(format!("成果 {} 状态损坏: {e}", self.id))
        })?;
        let attachments = match self.attachments.as_deref() {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw)?,
            _ => Vec::new(),
        };

        Ok(Achievement {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            content: self.content,
            attachments,
            status,
            score: self.score,
            reject_reason: self.reject_reason,
            reviewer_id: self.reviewer_id,
            reviewed_at: self
                .reviewed_at
                .map(|ts| DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()),
            previous_id: self.previous_id,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}

/// 附件列表序列化为 JSON 文本，空列表存为 NULL
pub fn encode_attachments(attachments: &[String]) -> crate::errors::Result<Option<String>> {
    if attachments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(attachments)?))
    }
}
