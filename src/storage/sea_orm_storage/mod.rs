//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod achievements;
mod review_audits;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{PortalError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, TransactionTrait};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例并运行迁移
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let storage = Self::connect(&config.database.url, &config.database).await?;
        storage.migrate().await?;

        info!("SeaORM 存储初始化完成，数据库: {}", config.database.url);

        Ok(storage)
    }

    /// 连接数据库（不运行迁移）
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Ok(Self { db })
    }

    /// 使用已有连接创建存储实例
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 运行数据库迁移
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.db, None)
            .await
            .map_err(|e| PortalError::database_operation(format!("数据库迁移失败: {e}")))
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| PortalError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size.max(1))
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| PortalError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(PortalError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, memory:// 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    achievements::{
        entities::{Achievement, AchievementStatus},
        requests::{AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest},
        responses::AchievementListResponse,
    },
    reviews::entities::{AuditRecord, NewAuditRecord, ReviewCommit, ReviewTransition},
};
use crate::storage::{AchievementStore, AuditTrail, Storage};
use async_trait::async_trait;

#[async_trait]
impl AchievementStore for SeaOrmStorage {
    async fn create_achievement(
        &self,
        owner_id: i64,
        req: CreateAchievementRequest,
        previous_id: Option<i64>,
    ) -> Result<Achievement> {
        self.create_achievement_impl(owner_id, req, previous_id)
            .await
    }

    async fn get_achievement_by_id(&self, id: i64) -> Result<Option<Achievement>> {
        achievements::find_achievement_on(&self.db, id).await
    }

    async fn get_achievement_by_previous_id(
        &self,
        previous_id: i64,
    ) -> Result<Option<Achievement>> {
        self.get_achievement_by_previous_id_impl(previous_id).await
    }

    async fn list_achievements_with_pagination(
        &self,
        query: AchievementListQuery,
    ) -> Result<AchievementListResponse> {
        self.list_achievements_with_pagination_impl(query).await
    }

    async fn update_pending_achievement(
        &self,
        id: i64,
        owner_id: i64,
        update: UpdateAchievementRequest,
    ) -> Result<Option<Achievement>> {
        self.update_pending_achievement_impl(id, owner_id, update)
            .await
    }

    async fn compare_and_swap_status(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: &ReviewTransition,
    ) -> Result<Achievement> {
        achievements::compare_and_swap_status_on(&self.db, id, expected, transition).await
    }
}

#[async_trait]
impl AuditTrail for SeaOrmStorage {
    async fn append_audit(&self, record: NewAuditRecord) -> Result<i64> {
        review_audits::append_audit_on(&self.db, record).await
    }

    async fn list_audits_by_achievement(&self, achievement_id: i64) -> Result<Vec<AuditRecord>> {
        self.list_audits_by_achievement_impl(achievement_id).await
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn commit_review(
        &self,
        id: i64,
        expected: AchievementStatus,
        transition: ReviewTransition,
    ) -> Result<ReviewCommit> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        // 事务内只使用 txn，任何一步失败时 txn 被丢弃并回滚
        let achievement =
            achievements::compare_and_swap_status_on(&txn, id, expected, &transition).await?;
        let record = transition.audit_record(id);
        let audit_id = review_audits::append_audit_on(&txn, record.clone()).await?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交审核事务失败: {e}")))?;

        Ok(ReviewCommit {
            achievement,
            audit: record.with_id(audit_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::models::reviews::entities::ReviewVerdict;
    use crate::utils::time;
    use sea_orm::ConnectionTrait;

    async fn storage() -> SeaOrmStorage {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        };
        let storage = SeaOrmStorage::connect(&config.url, &config).await.unwrap();
        storage.migrate().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn test_failed_audit_insert_rolls_back_status() {
        let storage = storage().await;
        let a = storage
            .create_achievement(
                7,
                CreateAchievementRequest {
                    title: "软件著作权".to_string(),
                    content: "登记证书".to_string(),
                    attachments: Vec::new(),
                },
                None,
            )
            .await
            .unwrap();

        // 审核记录表不可写，事务内的第二步必然失败
        storage
            .db
            .execute_unprepared("DROP TABLE review_audits")
            .await
            .unwrap();

        let err = storage
            .commit_review(
                a.id,
                AchievementStatus::Pending,
                ReviewTransition {
                    verdict: ReviewVerdict::Approved { score: 88 },
                    reviewer_id: 3,
                    reviewed_at: time::now(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);

        let current = storage.get_achievement_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(current.status, AchievementStatus::Pending);
        assert_eq!(current.score, None);
        assert_eq!(current.reviewer_id, None);
        assert_eq!(current.reviewed_at, None);
    }
}
