//! 恢复引擎 - 驱动协议状态机，执行其产出的效果
//!
//! 引擎是单条顺序任务：同一时刻只有一个在途远端调用，效果按序执行。
//! 同一 scope 的并发恢复不在此层协调，由调用方保证单飞。
//!
//! ## NOTE: Engine 不做重试
//!
//! 远端调用失败直接进入 Aborted 终态。重试 / 退避 / 生命周期策略
//! 必须由外层调度器实现，引擎内不得加重试循环。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use gramsync_protocol::{Chat, Message, UpdateNewMessage, User};

use crate::error::Result;
use crate::events::{RecoveredUpdate, UpdatesSender};
use crate::rpc_client::UpdatesRpc;
use crate::storage::SessionStorage;
use crate::sync::recovery::protocol::{Phase, RecoveryEffect, RecoveryLoop};

/// 账号全局游标的 scope id
pub const ACCOUNT_SCOPE: i64 = 0;

/// 发射的恢复事件的 pts_count 哨兵：离线恢复事件不参与 pts 差值校验
const RECOVERED_PTS_COUNT: i64 = -1;

/// 一次恢复调用的终态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// 服务端确认已追平
    Completed,
    /// 远端调用失败，中途停止
    Aborted,
    /// 服务端分片不再推进，中途停止
    NoProgress,
}

/// 恢复结果汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// 实际入队的消息数；队列中途关闭时被跳过的消息不计入
    pub messages_recovered: usize,
    /// 非消息更新计数；当前协议路径只发射新消息事件，保留作前向兼容
    pub other_updates: usize,
    pub outcome: RecoveryOutcome,
}

/// 恢复引擎
pub struct RecoveryEngine {
    storage: Arc<SessionStorage>,
    updates_tx: UpdatesSender,
}

impl RecoveryEngine {
    pub fn new(storage: Arc<SessionStorage>, updates_tx: UpdatesSender) -> Self {
        Self { storage, updates_tx }
    }

    /// 恢复账号全局 scope 的离线更新
    pub async fn recover_updates(&self, rpc: &dyn UpdatesRpc) -> Result<RecoveryReport> {
        self.run(rpc, ACCOUNT_SCOPE).await
    }

    async fn run(&self, rpc: &dyn UpdatesRpc, scope_id: i64) -> Result<RecoveryReport> {
        let state = self.storage.get_state(scope_id).await?;
        let mut fsm = RecoveryLoop::new(&state);
        let mut enqueued = 0usize;

        info!("开始恢复离线更新: scope={}, pts={}", scope_id, state.pts);

        while fsm.phase() == Phase::Querying {
            let request = fsm.query();
            debug!("差量查询: pts={}, date={}", request.pts, request.date);

            match rpc.get_difference(request).await {
                Ok(diff) => {
                    for effect in fsm.on_response(diff) {
                        enqueued += self.apply(scope_id, effect).await?;
                    }
                }
                Err(e) => {
                    error!("差量查询失败，恢复终止: {}", e);
                    fsm.on_rpc_error();
                }
            }
        }

        let outcome = match fsm.phase() {
            Phase::Done => RecoveryOutcome::Completed,
            Phase::Aborted => RecoveryOutcome::Aborted,
            Phase::NoProgress => {
                warn!("服务端分片不再推进，恢复提前结束: 已收 {} 条消息", fsm.message_count());
                RecoveryOutcome::NoProgress
            }
            Phase::Querying => unreachable!("循环只在终态退出"),
        };

        info!(
            "恢复结束: {} 条消息入队, {} 条其他更新, outcome={:?}",
            enqueued,
            fsm.other_count(),
            outcome
        );

        Ok(RecoveryReport {
            messages_recovered: enqueued,
            other_updates: fsm.other_count(),
            outcome,
        })
    }

    /// 执行状态机效果，返回实际入队的消息数；
    /// 游标写失败向上抛，队列关闭仅告警
    async fn apply(&self, scope_id: i64, effect: RecoveryEffect) -> Result<usize> {
        match effect {
            RecoveryEffect::PersistState { pts, date, qts, seq } => {
                self.storage.update_state(scope_id, pts, date, qts, seq).await?;
                Ok(0)
            }
            RecoveryEffect::EmitNewMessages { pts, messages, users, chats } => {
                Ok(self.emit_messages(pts, messages, users, chats))
            }
        }
    }

    /// 逐条入队，返回成功条数；接收端已关闭时跳过剩余消息
    fn emit_messages(
        &self,
        pts: i64,
        messages: Vec<Message>,
        users: Vec<User>,
        chats: Vec<Chat>,
    ) -> usize {
        // 映射按响应构建一次，本响应内所有消息共享（跨响应不合并）
        let users: Arc<HashMap<i64, User>> =
            Arc::new(users.into_iter().map(|u| (u.id, u)).collect());
        let chats: Arc<HashMap<i64, Chat>> =
            Arc::new(chats.into_iter().map(|c| (c.id, c)).collect());

        let mut sent = 0usize;
        for message in messages {
            let event = RecoveredUpdate {
                update: UpdateNewMessage {
                    message,
                    pts,
                    pts_count: RECOVERED_PTS_COUNT,
                },
                users: users.clone(),
                chats: chats.clone(),
            };
            if self.updates_tx.send(event).is_err() {
                warn!("更新队列已关闭，剩余恢复事件被丢弃");
                break;
            }
            sent += 1;
        }
        sent
    }
}
