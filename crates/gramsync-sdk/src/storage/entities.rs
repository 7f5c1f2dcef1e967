//! 存储层实体 - 同步游标与 peer 缓存记录

use serde::{Deserialize, Serialize};

use crate::error::{GramsyncError, Result};
use crate::utils;

/// 同步游标 - 每个 scope 一行，scope 0 为账号全局游标
///
/// 无持久化行时合成默认值（pts=1, date=now），默认值在显式写入前不落库。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateState {
    pub id: i64,
    pub pts: i64,
    /// 最近一次已知服务端状态的 Unix 时间（秒）
    pub date: i64,
    /// 独立事件流的副游标，本恢复协议不消费，但随行存取
    pub qts: Option<i64>,
    pub seq: Option<i64>,
}

impl UpdateState {
    /// 缺行时的合成默认游标
    pub fn default_for(id: i64) -> Self {
        Self {
            id,
            pts: 1,
            date: utils::now_ts(),
            qts: None,
            seq: None,
        }
    }
}

/// peer 类别 - 决定 InputPeer 的构造方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    User,
    Bot,
    Group,
    Channel,
    Supergroup,
}

impl PeerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerKind::User => "user",
            PeerKind::Bot => "bot",
            PeerKind::Group => "group",
            PeerKind::Channel => "channel",
            PeerKind::Supergroup => "supergroup",
        }
    }

    /// 从存储列还原；未知类别是类型化错误，不得静默兜底
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(PeerKind::User),
            "bot" => Ok(PeerKind::Bot),
            "group" => Ok(PeerKind::Group),
            "channel" => Ok(PeerKind::Channel),
            "supergroup" => Ok(PeerKind::Supergroup),
            other => Err(GramsyncError::InvalidPeerKind(other.to_string())),
        }
    }
}

/// peer 缓存记录 - 按 id 整行覆盖，不做字段级合并
///
/// `last_update_on` 由数据库在写入时自动刷新，不在实体中携带。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRecord {
    pub id: i64,
    /// 寻址凭证；group 类 peer 无凭证，存 0
    pub access_hash: i64,
    pub kind: PeerKind,
    pub username: Option<String>,
    pub phone_number: Option<String>,
}

/// 可直接用于后续调用的 peer 引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputPeer {
    User { user_id: i64, access_hash: i64 },
    Chat { chat_id: i64 },
    Channel { channel_id: i64, access_hash: i64 },
}

impl InputPeer {
    /// 按类别从存储行构造引用
    ///
    /// - user / bot     → id + access_hash
    /// - group          → 取负的 id，无凭证
    /// - channel / 超级群 → 编码后的 channel_id + access_hash
    pub fn from_parts(peer_id: i64, access_hash: i64, kind: PeerKind) -> Self {
        match kind {
            PeerKind::User | PeerKind::Bot => InputPeer::User {
                user_id: peer_id,
                access_hash,
            },
            PeerKind::Group => InputPeer::Chat { chat_id: -peer_id },
            PeerKind::Channel | PeerKind::Supergroup => InputPeer::Channel {
                channel_id: utils::get_channel_id(peer_id),
                access_hash,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_fresh() {
        let state = UpdateState::default_for(0);
        assert_eq!(state.pts, 1);
        assert!(state.qts.is_none());
        assert!(state.seq.is_none());
        assert!((utils::now_ts() - state.date).abs() <= 2);
    }

    #[test]
    fn peer_kind_parse_rejects_unknown() {
        assert_eq!(PeerKind::parse("supergroup").unwrap(), PeerKind::Supergroup);
        assert!(matches!(
            PeerKind::parse("gigagroup"),
            Err(GramsyncError::InvalidPeerKind(_))
        ));
    }

    #[test]
    fn input_peer_by_kind() {
        assert_eq!(
            InputPeer::from_parts(7, 99, PeerKind::Bot),
            InputPeer::User { user_id: 7, access_hash: 99 }
        );
        assert_eq!(
            InputPeer::from_parts(123, 0, PeerKind::Group),
            InputPeer::Chat { chat_id: -123 }
        );
        assert_eq!(
            InputPeer::from_parts(-1_001_234_567_890, 55, PeerKind::Channel),
            InputPeer::Channel { channel_id: 1_234_567_890, access_hash: 55 }
        );
    }
}
