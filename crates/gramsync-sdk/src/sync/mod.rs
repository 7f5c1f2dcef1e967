//! 同步模块 - 游标驱动的服务端状态追赶

pub mod recovery;

pub use recovery::{RecoveryEngine, RecoveryOutcome, RecoveryReport, ACCOUNT_SCOPE};
