use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建成果表
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Achievements::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Achievements::OwnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Achievements::Title).string().not_null())
                    .col(ColumnDef::new(Achievements::Content).text().not_null())
                    .col(ColumnDef::new(Achievements::Attachments).text().null())
                    .col(
                        ColumnDef::new(Achievements::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Achievements::Score).integer().null())
                    .col(ColumnDef::new(Achievements::RejectReason).text().null())
                    .col(
                        ColumnDef::new(Achievements::ReviewerId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::ReviewedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::PreviousId)
                            .big_integer()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Achievements::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Achievements::Table, Achievements::PreviousId)
                            .to(Achievements::Table, Achievements::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建审核记录表（只追加）
        manager
            .create_table(
                Table::create()
                    .table(ReviewAudits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewAudits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReviewAudits::AchievementId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewAudits::ReviewerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewAudits::Decision)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewAudits::ScoreOrReason)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewAudits::DecidedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ReviewAudits::Table, ReviewAudits::AchievementId)
                            .to(Achievements::Table, Achievements::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievements_owner_id")
                    .table(Achievements::Table)
                    .col(Achievements::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievements_status")
                    .table(Achievements::Table)
                    .col(Achievements::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_audits_achievement_decided")
                    .table(ReviewAudits::Table)
                    .col(ReviewAudits::AchievementId)
                    .col(ReviewAudits::DecidedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(ReviewAudits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Achievements::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Achievements {
    #[sea_orm(iden = "achievements")]
    Table,
    Id,
    OwnerId,
    Title,
    Content,
    Attachments,
    Status,
    Score,
    RejectReason,
    ReviewerId,
    ReviewedAt,
    PreviousId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReviewAudits {
    #[sea_orm(iden = "review_audits")]
    Table,
    Id,
    AchievementId,
    ReviewerId,
    Decision,
    ScoreOrReason,
    DecidedAt,
}
