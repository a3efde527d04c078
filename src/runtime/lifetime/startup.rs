use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::Result;
use crate::services::{NotificationEmitter, NotificationHub};
use crate::storage::Storage;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub emitter: Arc<dyn NotificationEmitter>,
}

/// 准备服务器启动的上下文：存储后端与通知发送方
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let hub = Arc::new(NotificationHub::from_config());
    info!("Notification hub initialized");

    Ok(StartupContext {
        storage,
        emitter: hub,
    })
}
