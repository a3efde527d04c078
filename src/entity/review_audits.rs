//! 审核记录实体

use sea_orm::entity::prelude::*;

use crate::errors::PortalError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_audits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub achievement_id: i64,
    pub reviewer_id: i64,
    pub decision: String,
    #[sea_orm(column_type = "Text")]
    pub score_or_reason: String,
    pub decided_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::achievements::Entity",
        from = "Column::AchievementId",
        to = "super::achievements::Column::Id"
    )]
    Achievement,
}

impl Related<super::achievements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Achievement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_audit(
        self,
    ) -> crate::errors::Result<crate::models::reviews::entities::AuditRecord> {
        use crate::models::reviews::entities::{AuditDecision, AuditRecord};
        use chrono::{DateTime, Utc};

        let decision = self.decision.parse::<AuditDecision>().map_err(|e| {
            PortalError::database_operation(format!("审核记录 {} 结论损坏: {e}", self.id))
        })?;

        Ok(AuditRecord {
            id: self.id,
            achievement_id: self.achievement_id,
            reviewer_id: self.reviewer_id,
            decision,
            score_or_reason: self.score_or_reason,
            decided_at: DateTime::<Utc>::from_timestamp(self.decided_at, 0).unwrap_or_default(),
        })
    }
}
