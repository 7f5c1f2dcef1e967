//! 离线更新恢复 - 差量追赶协议
//!
//! 协议逻辑（protocol）与效果执行（engine）分离：
//! 状态机纯函数化，便于无远端测试；engine 负责存储写入与事件发射。

mod engine;
mod protocol;

pub use engine::{RecoveryEngine, RecoveryOutcome, RecoveryReport, ACCOUNT_SCOPE};
pub use protocol::PTS_TOTAL_LIMIT;
