//! 会话存储模块 - 同步游标、peer 缓存与会话元数据
//!
//! 本模块提供：
//! - 单文件 SQLite 会话库（WAL，每次写入返回即已提交）
//! - 游标表 state：恢复引擎的断点，崩溃后从任意已持久化游标续跑都安全
//! - peer 缓存表 peers：username 带 8 小时新鲜度约束，id / phone 不过期
//! - session 表：显式类型化的会话属性存取器
//!
//! 并发模型：内部一把 tokio Mutex 串行化所有语句，单条语句即事务；
//! 不提供跨恢复循环的大事务。

pub mod dao;
pub mod entities;
pub mod migrate;

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::error::{GramsyncError, Result};
use crate::storage::dao::{PeerDao, PeerRow, SessionDao, StateDao};
use crate::storage::entities::{InputPeer, PeerKind, PeerRecord, UpdateState};
use crate::utils;

/// username 查找的新鲜度上限（秒）；超过即视为过期，须重新解析
pub const USERNAME_TTL: i64 = 8 * 60 * 60;

/// 会话存储门面
pub struct SessionStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SessionStorage {
    /// 打开（必要时创建）会话库：pragmas → migrations → 版本校验
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| GramsyncError::IO(format!("创建会话库目录失败: {}", e)))?;
        }

        let mut conn = Connection::open(path)
            .map_err(|e| GramsyncError::Database(format!("打开会话库失败: {}", e)))?;
        migrate::init_db(&mut conn)?;

        tracing::info!("会话库初始化完成: {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 测试与内嵌场景用的内存库
    pub async fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()
            .map_err(|e| GramsyncError::Database(format!("打开内存会话库失败: {}", e)))?;
        migrate::init_db(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    // ---------- 游标 ----------

    /// 读取 scope 游标；缺行合成默认值（pts=1, date=now），永不失败
    pub async fn get_state(&self, id: i64) -> Result<UpdateState> {
        let conn = self.conn.lock().await;
        StateDao::new(&conn).get(id)
    }

    /// upsert 游标；date 缺省以当前时间代入。写失败必须向上抛，
    /// 调用方不得把失败的游标写当成已持久化的进度。
    pub async fn update_state(
        &self,
        id: i64,
        pts: i64,
        date: Option<i64>,
        qts: Option<i64>,
        seq: Option<i64>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        StateDao::new(&conn).update(id, pts, date, qts, seq)
    }

    /// 本地状态疑似损坏时的维护入口：pts 置 1，其余字段不动
    pub async fn reset_state(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        StateDao::new(&conn).reset(id)
    }

    // ---------- peer 缓存 ----------

    /// 批量覆盖写入 peer 元数据（整行覆盖，last-write-wins）
    pub async fn update_peers(&self, peers: &[PeerRecord]) -> Result<()> {
        if peers.is_empty() {
            return Ok(());
        }
        let conn = self.conn.lock().await;
        PeerDao::new(&conn).bulk_upsert(peers)?;
        tracing::debug!("peer 缓存已更新 {} 条", peers.len());
        Ok(())
    }

    /// 按 id 解析 peer 引用；id 查找不设 TTL
    pub async fn get_peer_by_id(&self, peer_id: i64) -> Result<InputPeer> {
        let conn = self.conn.lock().await;
        let row = PeerDao::new(&conn)
            .get_by_id(peer_id)?
            .ok_or_else(|| GramsyncError::PeerNotFound(format!("id {}", peer_id)))?;
        input_peer_from_row(&row)
    }

    /// 按 username 解析 peer 引用
    ///
    /// 同名取最新一行；最新一行与当前时间相差超过 TTL（绝对值，双向）即判过期。
    pub async fn get_peer_by_username(&self, username: &str) -> Result<InputPeer> {
        let conn = self.conn.lock().await;
        let row = PeerDao::new(&conn)
            .get_by_username(username)?
            .ok_or_else(|| GramsyncError::PeerNotFound(format!("username {}", username)))?;

        if (utils::now_ts() - row.last_update_on).abs() > USERNAME_TTL {
            return Err(GramsyncError::PeerExpired(format!("username {}", username)));
        }

        input_peer_from_row(&row)
    }

    /// 按手机号解析 peer 引用；不设 TTL
    pub async fn get_peer_by_phone_number(&self, phone_number: &str) -> Result<InputPeer> {
        let conn = self.conn.lock().await;
        let row = PeerDao::new(&conn)
            .get_by_phone_number(phone_number)?
            .ok_or_else(|| GramsyncError::PeerNotFound(format!("phone {}", phone_number)))?;
        input_peer_from_row(&row)
    }

    // ---------- 会话属性 ----------

    pub async fn dc_id(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).dc_id()
    }

    pub async fn set_dc_id(&self, dc_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_dc_id(dc_id)
    }

    pub async fn api_id(&self) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).api_id()
    }

    pub async fn set_api_id(&self, api_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_api_id(api_id)
    }

    pub async fn test_mode(&self) -> Result<Option<bool>> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).test_mode()
    }

    pub async fn set_test_mode(&self, test_mode: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_test_mode(test_mode)
    }

    pub async fn auth_key(&self) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).auth_key()
    }

    pub async fn set_auth_key(&self, auth_key: &[u8]) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_auth_key(auth_key)
    }

    pub async fn user_id(&self) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).user_id()
    }

    pub async fn set_user_id(&self, user_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_user_id(user_id)
    }

    pub async fn is_bot(&self) -> Result<Option<bool>> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).is_bot()
    }

    pub async fn set_is_bot(&self, is_bot: bool) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_is_bot(is_bot)
    }

    /// 保存会话：刷新 session.date 为当前时间
    pub async fn save(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        SessionDao::new(&conn).set_date(utils::now_ts())
    }
}

/// 从存储行构造 InputPeer；kind 列非法即类型化失败
fn input_peer_from_row(row: &PeerRow) -> Result<InputPeer> {
    let kind = PeerKind::parse(&row.kind)?;
    Ok(InputPeer::from_parts(row.id, row.access_hash, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> SessionStorage {
        SessionStorage::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn open_on_disk_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("session.db");

        {
            let storage = SessionStorage::open(&db_path).await.unwrap();
            storage.update_state(0, 10, Some(500), None, Some(1)).await.unwrap();
        }

        // 重新打开后游标仍在（每次写入即持久化）
        let storage = SessionStorage::open(&db_path).await.unwrap();
        let state = storage.get_state(0).await.unwrap();
        assert_eq!(state.pts, 10);
        assert_eq!(state.date, 500);
        assert_eq!(state.seq, Some(1));
    }

    #[tokio::test]
    async fn resolve_peers_by_kind() {
        let storage = test_storage().await;
        storage
            .update_peers(&[
                PeerRecord {
                    id: 101,
                    access_hash: 11,
                    kind: PeerKind::User,
                    username: Some("alice".into()),
                    phone_number: Some("+861390000".into()),
                },
                PeerRecord {
                    id: 202,
                    access_hash: 0,
                    kind: PeerKind::Group,
                    username: None,
                    phone_number: None,
                },
                PeerRecord {
                    id: -1_001_234_567_890,
                    access_hash: 33,
                    kind: PeerKind::Supergroup,
                    username: Some("bigchat".into()),
                    phone_number: None,
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            storage.get_peer_by_id(101).await.unwrap(),
            InputPeer::User { user_id: 101, access_hash: 11 }
        );
        assert_eq!(
            storage.get_peer_by_id(202).await.unwrap(),
            InputPeer::Chat { chat_id: -202 }
        );
        assert_eq!(
            storage.get_peer_by_username("bigchat").await.unwrap(),
            InputPeer::Channel { channel_id: 1_234_567_890, access_hash: 33 }
        );
        assert_eq!(
            storage.get_peer_by_phone_number("+861390000").await.unwrap(),
            InputPeer::User { user_id: 101, access_hash: 11 }
        );
    }

    #[tokio::test]
    async fn missing_peer_is_not_found() {
        let storage = test_storage().await;
        assert!(matches!(
            storage.get_peer_by_id(404).await,
            Err(GramsyncError::PeerNotFound(_))
        ));
        assert!(matches!(
            storage.get_peer_by_username("ghost").await,
            Err(GramsyncError::PeerNotFound(_))
        ));
        assert!(matches!(
            storage.get_peer_by_phone_number("+0").await,
            Err(GramsyncError::PeerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn username_ttl_is_symmetric() {
        let storage = test_storage().await;
        let now = utils::now_ts();

        // 9 小时前、1 小时前、9 小时后三条记录（INSERT 不触发刷新触发器）
        {
            let conn = storage.connection();
            let conn = conn.lock().await;
            for (id, offset) in [(1i64, -9 * 3600i64), (2, -3600), (3, 9 * 3600)] {
                conn.execute(
                    "INSERT INTO peers (id, access_hash, kind, username, last_update_on)
                     VALUES (?1, 1, 'user', ?2, ?3)",
                    rusqlite::params![id, format!("u{}", id), now + offset],
                )
                .unwrap();
            }
        }

        assert!(matches!(
            storage.get_peer_by_username("u1").await,
            Err(GramsyncError::PeerExpired(_))
        ));
        assert!(storage.get_peer_by_username("u2").await.is_ok());
        // 时间戳在未来同样过期（对称判定）
        assert!(matches!(
            storage.get_peer_by_username("u3").await,
            Err(GramsyncError::PeerExpired(_))
        ));

        // id 查找不过期
        assert!(storage.get_peer_by_id(1).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_kind_is_typed_failure() {
        let storage = test_storage().await;
        {
            let conn = storage.connection();
            let conn = conn.lock().await;
            conn.execute(
                "INSERT INTO peers (id, access_hash, kind) VALUES (9, 1, 'gigagroup')",
                [],
            )
            .unwrap();
        }
        assert!(matches!(
            storage.get_peer_by_id(9).await,
            Err(GramsyncError::InvalidPeerKind(_))
        ));
    }

    #[tokio::test]
    async fn save_refreshes_session_date() {
        let storage = test_storage().await;
        assert_eq!(storage.dc_id().await.unwrap(), 2);

        storage.save().await.unwrap();
        let conn = storage.connection();
        let conn = conn.lock().await;
        let date: i64 = conn
            .query_row("SELECT date FROM session WHERE id = 0", [], |r| r.get(0))
            .unwrap();
        assert!((utils::now_ts() - date).abs() <= 2);
    }
}
