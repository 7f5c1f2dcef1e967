//! Peer DAO - peers 表（可寻址实体缓存）
//!
//! 写入按 id 整行覆盖（REPLACE），不做字段级合并；
//! last_update_on 由列默认值 / 触发器维护，DAO 不手写。

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::storage::entities::PeerRecord;

/// 按 id / username / phone 查出的原始行；TTL 与 InputPeer 构造由上层负责
#[derive(Debug, Clone)]
pub struct PeerRow {
    pub id: i64,
    pub access_hash: i64,
    pub kind: String,
    pub last_update_on: i64,
}

pub struct PeerDao<'a> {
    conn: &'a Connection,
}

impl<'a> PeerDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 批量覆盖写入，单事务提交
    pub fn bulk_upsert(&self, peers: &[PeerRecord]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for p in peers {
            tx.execute(
                "REPLACE INTO peers (id, access_hash, kind, username, phone_number)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![p.id, p.access_hash, p.kind.as_str(), p.username, p.phone_number],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_by_id(&self, peer_id: i64) -> Result<Option<PeerRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, access_hash, kind, last_update_on FROM peers WHERE id = ?1",
                params![peer_id],
                row_to_peer,
            )
            .optional()?;
        Ok(row)
    }

    /// 同名取 last_update_on 最新的一行
    pub fn get_by_username(&self, username: &str) -> Result<Option<PeerRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, access_hash, kind, last_update_on FROM peers
                 WHERE username = ?1 ORDER BY last_update_on DESC LIMIT 1",
                params![username],
                row_to_peer,
            )
            .optional()?;
        Ok(row)
    }

    pub fn get_by_phone_number(&self, phone_number: &str) -> Result<Option<PeerRow>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, access_hash, kind, last_update_on FROM peers
                 WHERE phone_number = ?1",
                params![phone_number],
                row_to_peer,
            )
            .optional()?;
        Ok(row)
    }
}

fn row_to_peer(row: &rusqlite::Row) -> rusqlite::Result<PeerRow> {
    Ok(PeerRow {
        id: row.get(0)?,
        access_hash: row.get(1)?,
        kind: row.get(2)?,
        last_update_on: row.get(3)?,
    })
}
