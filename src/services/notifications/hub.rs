/*!
 * 进程内通知中心
 *
 * 每个学生一个广播通道，实时推送层（WebSocket、SSE 等）通过 `subscribe` 获取接收端。
 * 没有订阅者时事件直接丢弃。
 */

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use super::NotificationEmitter;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::notifications::entities::ReviewNotification;

pub struct NotificationHub {
    /// 学生 ID -> 广播发送器
    channels: DashMap<i64, broadcast::Sender<ReviewNotification>>,
    capacity: usize,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn from_config() -> Self {
        Self::new(AppConfig::get().notifications.channel_capacity)
    }

    // 以下三个方法供推送层使用，本服务自身不挂载推送端点

    /// 订阅某个学生的审核通知
    pub fn subscribe(&self, owner_id: i64) -> broadcast::Receiver<ReviewNotification> {
        self.channels
            .entry(owner_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 当前在线的订阅者数量
    pub fn subscriber_count(&self, owner_id: i64) -> usize {
        self.channels
            .get(&owner_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// 移除已没有订阅者的通道
    pub fn prune(&self, owner_id: i64) {
        self.channels
            .remove_if(&owner_id, |_, tx| tx.receiver_count() == 0);
    }
}

#[async_trait]
impl NotificationEmitter for NotificationHub {
    async fn emit(&self, notification: ReviewNotification) -> Result<()> {
        let owner_id = notification.owner_id;
        let sender = self.channels.get(&owner_id).map(|tx| tx.clone());

        let delivered = match sender {
            Some(tx) => tx.send(notification).unwrap_or(0),
            None => 0,
        };

        if delivered == 0 {
            debug!("No live subscriber for user {}, notification dropped", owner_id);
            self.prune(owner_id);
        } else {
            debug!(
                "Review notification delivered to {} subscriber(s) of user {}",
                delivered, owner_id
            );
        }
        Ok(())
    }
}
