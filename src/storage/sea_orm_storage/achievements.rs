//! 成果存储操作

use super::SeaOrmStorage;
use crate::entity::achievements::{ActiveModel, Column, Entity as Achievements, encode_attachments};
use crate::errors::{PortalError, Result};
use crate::models::{
    PaginationInfo,
    achievements::{
        entities::{Achievement, AchievementStatus},
        requests::{AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest},
        responses::AchievementListResponse,
    },
    common::pagination::normalize_page,
    reviews::entities::ReviewTransition,
};
use crate::storage::conflict_for;
use crate::utils::time;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

/// 通过 ID 读取成果，可在事务内使用
pub(super) async fn find_achievement_on<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Achievement>> {
    let result = Achievements::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询成果失败: {e}")))?;

    result.map(|m| m.into_achievement()).transpose()
}

/// 条件更新：`WHERE id = ? AND status = ?`，受影响行数为 0 时重新读取以区分不存在与状态冲突
pub(super) async fn compare_and_swap_status_on<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    expected: AchievementStatus,
    transition: &ReviewTransition,
) -> Result<Achievement> {
    let verdict = &transition.verdict;
    let reviewed_at = transition.reviewed_at.timestamp();

    let result = Achievements::update_many()
        .col_expr(Column::Status, Expr::value(verdict.status().as_str()))
        .col_expr(Column::Score, Expr::value(verdict.score()))
        .col_expr(
            Column::RejectReason,
            Expr::value(verdict.reject_reason().map(str::to_string)),
        )
        .col_expr(Column::ReviewerId, Expr::value(transition.reviewer_id))
        .col_expr(Column::ReviewedAt, Expr::value(reviewed_at))
        .col_expr(Column::UpdatedAt, Expr::value(reviewed_at))
        .filter(Column::Id.eq(id))
        .filter(Column::Status.eq(expected.as_str()))
        .exec(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("更新成果状态失败: {e}")))?;

    let current = find_achievement_on(conn, id)
        .await?
        .ok_or_else(|| PortalError::not_found(format!("成果不存在: {id}")))?;

    if result.rows_affected == 0 {
        return Err(conflict_for(id, expected, current.status));
    }
    Ok(current)
}

impl SeaOrmStorage {
    /// 创建成果
    pub async fn create_achievement_impl(
        &self,
        owner_id: i64,
        req: CreateAchievementRequest,
        previous_id: Option<i64>,
    ) -> Result<Achievement> {
        let now = time::now().timestamp();

        let model = ActiveModel {
            owner_id: Set(owner_id),
            title: Set(req.title),
            content: Set(req.content),
            attachments: Set(encode_attachments(&req.attachments)?),
            status: Set(AchievementStatus::Pending.as_str().to_string()),
            score: Set(None),
            reject_reason: Set(None),
            reviewer_id: Set(None),
            reviewed_at: Set(None),
            previous_id: Set(previous_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            // previous_id 唯一：同一个被驳回的实例只能重新提交一次
            if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
                PortalError::conflict(format!(
                    "成果 {} 已经重新提交过",
                    previous_id.unwrap_or_default()
                ))
            } else {
                PortalError::database_operation(format!("创建成果失败: {e}"))
            }
        })?;

        result.into_achievement()
    }

    /// 获取某个实例的重新提交
    pub async fn get_achievement_by_previous_id_impl(
        &self,
        previous_id: i64,
    ) -> Result<Option<Achievement>> {
        let result = Achievements::find()
            .filter(Column::PreviousId.eq(previous_id))
            .one(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询重新提交失败: {e}")))?;

        result.map(|m| m.into_achievement()).transpose()
    }

    /// 分页列出成果
    pub async fn list_achievements_with_pagination_impl(
        &self,
        query: AchievementListQuery,
    ) -> Result<AchievementListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Achievements::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(owner_id) = query.owner_id {
            select = select.filter(Column::OwnerId.eq(owner_id));
        }

        // 最新优先，同一秒内按 ID 倒序
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| PortalError::database_operation(format!("查询成果总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询成果列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_achievement())
            .collect::<Result<Vec<_>>>()?;

        Ok(AchievementListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    /// 提交者修改待审核成果
    ///
    /// 条件写入，与审核并发时不会覆盖已审核的记录。
    pub async fn update_pending_achievement_impl(
        &self,
        id: i64,
        owner_id: i64,
        update: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>> {
        let mut stmt = Achievements::update_many()
            .col_expr(Column::UpdatedAt, Expr::value(time::now().timestamp()));

        if let Some(title) = update.title {
            stmt = stmt.col_expr(Column::Title, Expr::value(title));
        }
        if let Some(content) = update.content {
            stmt = stmt.col_expr(Column::Content, Expr::value(content));
        }
        if let Some(attachments) = update.attachments {
            stmt = stmt.col_expr(
                Column::Attachments,
                Expr::value(encode_attachments(&attachments)?),
            );
        }

        let result = stmt
            .filter(Column::Id.eq(id))
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Status.eq(AchievementStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新成果失败: {e}")))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        find_achievement_on(&self.db, id).await
    }
}
