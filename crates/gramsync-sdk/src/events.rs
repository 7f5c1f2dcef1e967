//! 更新事件队列 - 恢复引擎与下游分发器之间的接口
//!
//! 队列无界、入队永不阻塞；分发器在 SDK 之外消费。
//! 同一次恢复调用内事件严格有序：响应串行处理，响应内按消息顺序入队。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use gramsync_protocol::{Chat, UpdateNewMessage, User};

/// 恢复出的更新事件：更新体 + 本响应内嵌的 users / chats 映射
///
/// 映射按响应构建、同响应内的消息共享一份（Arc），跨响应不合并，
/// 也不与 peer 缓存交叉引用。
#[derive(Debug, Clone)]
pub struct RecoveredUpdate {
    pub update: UpdateNewMessage,
    pub users: Arc<HashMap<i64, User>>,
    pub chats: Arc<HashMap<i64, Chat>>,
}

pub type UpdatesSender = mpsc::UnboundedSender<RecoveredUpdate>;
pub type UpdatesReceiver = mpsc::UnboundedReceiver<RecoveredUpdate>;

/// 创建更新事件队列
pub fn updates_channel() -> (UpdatesSender, UpdatesReceiver) {
    mpsc::unbounded_channel()
}
