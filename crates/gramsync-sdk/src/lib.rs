//! Gramsync SDK - 远程过程协议客户端的同步核心
//!
//! 本 crate 提供：
//! - 📍 游标存储：崩溃一致的同步位置（pts/date/qts/seq），按 scope 分行
//! - 📇 peer 缓存：id / username / 手机号三路解析，username 带新鲜度约束
//! - 🔁 恢复引擎：差量追赶协议的显式状态机 + 效果驱动
//! - 🔐 会话元数据：显式类型化的单行会话属性存取
//!
//! 传输层、RPC 分发与事件消费者都在 SDK 之外，
//! 分别通过 [`rpc_client::UpdatesRpc`] 与 [`events::updates_channel`] 对接。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use gramsync_sdk::{events, RecoveryEngine, SessionStorage};
//! # use gramsync_sdk::rpc_client::UpdatesRpc;
//!
//! # async fn run(rpc: &dyn UpdatesRpc) -> gramsync_sdk::Result<()> {
//! let storage = Arc::new(SessionStorage::open(Path::new("session.db")).await?);
//! let (tx, _rx) = events::updates_channel();
//!
//! let engine = RecoveryEngine::new(storage.clone(), tx);
//! let report = engine.recover_updates(rpc).await?;
//! tracing::info!("恢复了 {} 条消息", report.messages_recovered);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod rpc_client;
pub mod storage;
pub mod sync;
pub mod utils;
pub mod version;

// 重新导出核心类型，方便使用
pub use error::{GramsyncError, Result};
pub use events::{updates_channel, RecoveredUpdate, UpdatesReceiver, UpdatesSender};
pub use rpc_client::UpdatesRpc;
pub use storage::entities::{InputPeer, PeerKind, PeerRecord, UpdateState};
pub use storage::{SessionStorage, USERNAME_TTL};
pub use sync::{RecoveryEngine, RecoveryOutcome, RecoveryReport, ACCOUNT_SCOPE};

// 重新导出协议层类型，避免用户单独导入 gramsync-protocol
pub use gramsync_protocol::*;
