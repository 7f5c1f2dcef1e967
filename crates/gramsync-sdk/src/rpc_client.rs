//! RPC 抽象 - 差量接口的不透明远端调用
//!
//! 传输与加密在 SDK 之外；恢复引擎只依赖这一个窄接口。
//! 任何传输 / 协议错误都映射为 `GramsyncError::Rpc`，引擎遇错即终止，不重试。

use async_trait::async_trait;

use crate::error::Result;
use gramsync_protocol::{Difference, GetDifference};

/// updates.getDifference 的远端调用方
#[async_trait]
pub trait UpdatesRpc: Send + Sync {
    async fn get_difference(&self, request: GetDifference) -> Result<Difference>;
}
