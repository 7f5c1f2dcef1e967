//! 差量同步协议类型 - updates.getDifference 请求与响应
//!
//! 响应是四选一的 tagged union：Empty / TooLong / Full / Slice。
//! 恢复引擎（gramsync-sdk::sync::recovery）对每种形态有不同的游标语义，
//! 详见该模块文档。

use serde::{Deserialize, Serialize};

use crate::types::{Chat, Message, User};

/// 差量查询请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetDifference {
    pub pts: i64,
    pub date: i64,
    pub qts: i64,
    /// 单次响应允许覆盖的最大 pts 跨度
    pub pts_total_limit: i64,
}

/// 服务端事件流位置（完整差量的终态 / 分片差量的中间态）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdatesState {
    pub pts: i64,
    pub date: i64,
    pub seq: i64,
}

/// 差量响应的四种形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_")]
pub enum Difference {
    /// 客户端已是最新，仅刷新 date / seq
    #[serde(rename = "updates.differenceEmpty")]
    Empty { date: i64, seq: i64 },
    /// 间隔太大，服务端无法以差量表达，只给出权威 pts
    #[serde(rename = "updates.differenceTooLong")]
    TooLong { pts: i64 },
    /// 完整差量，state 为应用后的终态
    #[serde(rename = "updates.difference")]
    Full {
        state: UpdatesState,
        new_messages: Vec<Message>,
        users: Vec<User>,
        chats: Vec<Chat>,
    },
    /// 部分差量，还有剩余；intermediate_state 为本片之后的中间态
    #[serde(rename = "updates.differenceSlice")]
    Slice {
        intermediate_state: UpdatesState,
        new_messages: Vec<Message>,
        users: Vec<User>,
        chats: Vec<Chat>,
    },
}

/// 新消息更新事件 - 恢复引擎向下游分发的基本单元
///
/// `pts_count = -1` 为约定哨兵：表示该事件来自离线恢复，
/// 下游不得将其计入 pts 差值校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNewMessage {
    pub message: Message,
    pub pts: i64,
    pub pts_count: i64,
}
