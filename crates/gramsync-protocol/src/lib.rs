//! gramsync 协议层 - 与服务端交互的原始类型定义
//!
//! 本 crate 只定义类型，不包含任何网络或存储逻辑：
//! - 基础实体：用户 / 群聊 / 消息
//! - 差量同步协议：get_difference 请求与四种响应形态
//!
//! SDK 层（gramsync-sdk）通过这些类型与任意传输实现对接。

pub mod types;
pub mod updates;

pub use types::{Chat, Message, User};
pub use updates::{Difference, GetDifference, UpdateNewMessage, UpdatesState};
