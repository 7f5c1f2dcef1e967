//! 基础实体类型 - 服务端在差量响应中内嵌的用户 / 群聊 / 消息
//!
//! 注意：这些是服务端下发的原始对象，字段按需精简；
//! 本地持久化使用 SDK 层的实体（见 gramsync-sdk::storage::entities）。

use serde::{Deserialize, Serialize};

/// 服务端用户对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// 寻址凭证；服务端对部分用户不下发
    pub access_hash: Option<i64>,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

/// 服务端群聊 / 频道对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub access_hash: Option<i64>,
    pub title: String,
    pub username: Option<String>,
    /// true = 频道 / 超级群，false = 普通群
    #[serde(default)]
    pub is_channel: bool,
}

/// 服务端消息对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// 消息时间（Unix 秒，UTC）
    pub date: i64,
    pub from_id: Option<i64>,
    /// 消息所属会话的 peer id
    pub peer_id: i64,
    pub text: Option<String>,
}
