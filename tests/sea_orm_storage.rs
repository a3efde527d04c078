//! SeaORM 存储在内存 SQLite 上的集成测试（经过真实迁移）

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use achievement_portal::config::DatabaseConfig;
use achievement_portal::errors::ErrorKind;
use achievement_portal::models::achievements::entities::AchievementStatus;
use achievement_portal::models::achievements::requests::{
    AchievementListQuery, CreateAchievementRequest, UpdateAchievementRequest,
};
use achievement_portal::models::reviews::entities::{
    AuditDecision, ReviewTransition, ReviewVerdict,
};
use achievement_portal::models::reviews::requests::ReviewPayload;
use achievement_portal::models::users::entities::{Caller, UserRole};
use achievement_portal::services::achievements::resubmit::resubmit;
use achievement_portal::services::{NotificationHub, ReviewEngine};
use achievement_portal::storage::sea_orm_storage::SeaOrmStorage;
use achievement_portal::storage::{AchievementStore, AuditTrail, Storage};
use achievement_portal::utils::time;

async fn storage() -> SeaOrmStorage {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        pool_size: 1,
        timeout: 5,
    };
    let storage = SeaOrmStorage::connect(&config.url, &config)
        .await
        .expect("connect in-memory sqlite");
    storage.migrate().await.expect("run migrations");
    storage
}

/// 测试结束时删除的临时 SQLite 文件（含 WAL 与共享内存文件）
struct TempDatabase {
    path: PathBuf,
}

impl TempDatabase {
    fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "achievement-portal-{tag}-{}-{nanos}.db",
            std::process::id()
        ));
        Self { path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

fn submission(title: &str) -> CreateAchievementRequest {
    CreateAchievementRequest {
        title: title.to_string(),
        content: "国家级大学生创新创业训练计划结题报告".to_string(),
        attachments: vec!["report.pdf".to_string(), "photo.png".to_string()],
    }
}

fn approve(reviewer_id: i64, score: i32) -> ReviewTransition {
    ReviewTransition {
        verdict: ReviewVerdict::Approved { score },
        reviewer_id,
        reviewed_at: time::now(),
    }
}

fn reject(reviewer_id: i64, reason: &str) -> ReviewTransition {
    ReviewTransition {
        verdict: ReviewVerdict::Rejected {
            reason: reason.to_string(),
        },
        reviewer_id,
        reviewed_at: time::now(),
    }
}

#[tokio::test]
async fn test_create_and_read_back() {
    let storage = storage().await;
    let created = storage
        .create_achievement(7, submission("大创结题"), None)
        .await
        .unwrap();

    assert_eq!(created.status, AchievementStatus::Pending);
    assert!(created.is_consistent());

    let loaded = storage
        .get_achievement_by_id(created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.attachments, vec!["report.pdf", "photo.png"]);
}

#[tokio::test]
async fn test_commit_review_writes_status_and_audit() {
    let storage = storage().await;
    let a = storage
        .create_achievement(7, submission("大创结题"), None)
        .await
        .unwrap();

    let commit = storage
        .commit_review(a.id, AchievementStatus::Pending, approve(3, 92))
        .await
        .unwrap();
    assert_eq!(commit.achievement.status, AchievementStatus::Approved);
    assert_eq!(commit.achievement.score, Some(92));
    assert_eq!(commit.achievement.reviewer_id, Some(3));
    assert!(commit.achievement.is_consistent());
    assert_eq!(commit.audit.decision, AuditDecision::Approved);
    assert_eq!(commit.audit.score_or_reason, "92");

    let audits = storage.list_audits_by_achievement(a.id).await.unwrap();
    assert_eq!(audits, vec![commit.audit]);
}

#[tokio::test]
async fn test_second_commit_conflicts_without_extra_audit() {
    let storage = storage().await;
    let a = storage
        .create_achievement(7, submission("大创结题"), None)
        .await
        .unwrap();
    storage
        .commit_review(a.id, AchievementStatus::Pending, reject(3, "缺少结题证明"))
        .await
        .unwrap();

    let err = storage
        .commit_review(a.id, AchievementStatus::Pending, approve(4, 80))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let current = storage.get_achievement_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(current.status, AchievementStatus::Rejected);
    assert_eq!(current.reject_reason.as_deref(), Some("缺少结题证明"));
    assert_eq!(current.reviewer_id, Some(3));
    assert_eq!(
        storage.list_audits_by_achievement(a.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_compare_and_swap_missing_is_not_found() {
    let storage = storage().await;
    let err = storage
        .compare_and_swap_status(404, AchievementStatus::Pending, &approve(3, 60))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = storage
        .commit_review(404, AchievementStatus::Pending, approve(3, 60))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_pending_is_conditional() {
    let storage = storage().await;
    let a = storage
        .create_achievement(7, submission("初稿"), None)
        .await
        .unwrap();

    let edit = UpdateAchievementRequest {
        title: Some("终稿".to_string()),
        ..Default::default()
    };
    let updated = storage
        .update_pending_achievement(a.id, 7, edit.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.title, "终稿");

    // 非本人
    assert!(
        storage
            .update_pending_achievement(a.id, 8, edit.clone())
            .await
            .unwrap()
            .is_none()
    );

    // 已审核
    storage
        .commit_review(a.id, AchievementStatus::Pending, approve(3, 75))
        .await
        .unwrap();
    assert!(
        storage
            .update_pending_achievement(a.id, 7, edit)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_resubmission_is_unique_per_prior() {
    let storage = storage().await;
    let prior = storage
        .create_achievement(7, submission("初版"), None)
        .await
        .unwrap();
    storage
        .commit_review(prior.id, AchievementStatus::Pending, reject(3, "材料不全"))
        .await
        .unwrap();

    let next = storage
        .create_achievement(7, submission("补充版"), Some(prior.id))
        .await
        .unwrap();
    assert_eq!(next.previous_id, Some(prior.id));
    assert_eq!(
        storage
            .get_achievement_by_previous_id(prior.id)
            .await
            .unwrap()
            .map(|a| a.id),
        Some(next.id)
    );

    // 唯一约束拒绝第二次重新提交
    let err = storage
        .create_achievement(7, submission("再补充版"), Some(prior.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // 业务层同样拒绝
    let err = resubmit(
        &storage,
        Caller::new(7, UserRole::Student),
        prior.id,
        submission("第三版"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let storage = storage().await;
    for i in 0..5 {
        storage
            .create_achievement(7, submission(&format!("成果{i}")), None)
            .await
            .unwrap();
    }
    let other = storage
        .create_achievement(8, submission("他人成果"), None)
        .await
        .unwrap();
    storage
        .commit_review(other.id, AchievementStatus::Pending, approve(3, 70))
        .await
        .unwrap();

    let page = storage
        .list_achievements_with_pagination(AchievementListQuery {
            page: Some(1),
            size: Some(2),
            owner_id: Some(7),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.items[0].id > page.items[1].id);

    let approved = storage
        .list_achievements_with_pagination(AchievementListQuery {
            status: Some(AchievementStatus::Approved),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(approved.pagination.total, 1);
    assert_eq!(approved.items[0].id, other.id);
}

#[tokio::test]
async fn test_engine_end_to_end_notifies_owner() {
    let storage: Arc<dyn Storage> = Arc::new(storage().await);
    let hub = Arc::new(NotificationHub::new(8));
    let engine = ReviewEngine::new(storage.clone(), hub.clone());

    let a = storage
        .create_achievement(7, submission("专利"), None)
        .await
        .unwrap();
    let mut rx = hub.subscribe(7);

    let result = engine
        .submit_review(a.id, 3, UserRole::Teacher, "approve", ReviewPayload::approve(100))
        .await
        .unwrap();
    assert_eq!(result.status, AchievementStatus::Approved);
    assert_eq!(result.score, Some(100));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.achievement_id, a.id);
    assert_eq!(event.decision, AuditDecision::Approved);
    assert_eq!(event.decided_at, result.reviewed_at);

    let err = engine
        .submit_review(a.id, 4, UserRole::Admin, "reject", ReviewPayload::reject("重复"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(storage.list_audits_by_achievement(a.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reviews_on_pooled_sqlite_have_one_winner() {
    let file = TempDatabase::new("race");
    let config = DatabaseConfig {
        url: file.url(),
        pool_size: 8,
        timeout: 10,
    };
    let sqlite = SeaOrmStorage::connect(&config.url, &config)
        .await
        .expect("connect file sqlite");
    sqlite.migrate().await.expect("run migrations");

    let storage: Arc<dyn Storage> = Arc::new(sqlite);
    let engine = Arc::new(ReviewEngine::new(
        storage.clone(),
        Arc::new(NotificationHub::new(8)),
    ));

    for round in 0..5 {
        let a = storage
            .create_achievement(7, submission(&format!("第{round}轮竞赛成果")), None)
            .await
            .unwrap();
        let id = a.id;

        let handles: Vec<_> = (0..8i64)
            .map(|reviewer| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    let (decision, payload) = if reviewer % 2 == 0 {
                        ("approve", ReviewPayload::approve(60 + reviewer))
                    } else {
                        ("reject", ReviewPayload::reject(format!("评审意见 {reviewer}")))
                    };
                    engine
                        .submit_review(id, 100 + reviewer, UserRole::Teacher, decision, payload)
                        .await
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok(result) => winners.push(result),
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict, "round {round}: {e:?}"),
            }
        }
        assert_eq!(winners.len(), 1, "round {round}");
        let winner = &winners[0];

        let stored = storage.get_achievement_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, winner.status);
        assert_eq!(stored.reviewer_id, Some(winner.reviewer_id));
        assert!(stored.is_consistent());

        let audits = storage.list_audits_by_achievement(id).await.unwrap();
        assert_eq!(audits.len(), 1, "round {round}");
        assert_eq!(audits[0].reviewer_id, winner.reviewer_id);
        assert_eq!(audits[0].id, winner.audit_id);
    }
}
