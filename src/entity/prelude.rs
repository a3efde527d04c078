//! 预导入模块，方便使用

pub use super::achievements::{
    ActiveModel as AchievementActiveModel, Entity as Achievements, Model as AchievementModel,
};
pub use super::review_audits::{
    ActiveModel as ReviewAuditActiveModel, Entity as ReviewAudits, Model as ReviewAuditModel,
};
