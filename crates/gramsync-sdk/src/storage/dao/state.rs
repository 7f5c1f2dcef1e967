//! 游标 DAO - state 表（每个 scope 一行同步位置）

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::storage::entities::UpdateState;
use crate::utils;

pub struct StateDao<'a> {
    conn: &'a Connection,
}

impl<'a> StateDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 读取 scope 游标；缺行返回合成默认值（pts=1, date=now），不落库
    pub fn get(&self, id: i64) -> Result<UpdateState> {
        let row = self
            .conn
            .query_row(
                "SELECT id, pts, date, qts, seq FROM state WHERE id = ?1",
                params![id],
                |row| {
                    Ok(UpdateState {
                        id: row.get(0)?,
                        pts: row.get(1)?,
                        date: row.get(2)?,
                        qts: row.get(3)?,
                        seq: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(row.unwrap_or_else(|| UpdateState::default_for(id)))
    }

    /// upsert 游标；date 缺省时以当前时间代入。
    /// 单条 REPLACE 自带原子性，返回即已提交，读者不会看到半行。
    pub fn update(
        &self,
        id: i64,
        pts: i64,
        date: Option<i64>,
        qts: Option<i64>,
        seq: Option<i64>,
    ) -> Result<()> {
        let date = date.unwrap_or_else(utils::now_ts);
        self.conn.execute(
            "REPLACE INTO state (id, pts, date, qts, seq) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, pts, date, qts, seq],
        )?;
        Ok(())
    }

    /// 就地复位：pts 置 1，date / qts / seq 不动；缺行时是 no-op，幂等
    pub fn reset(&self, id: i64) -> Result<()> {
        self.conn
            .execute("UPDATE state SET pts = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrate;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate::init_db(&mut conn).unwrap();
        conn
    }

    #[test]
    fn missing_scope_yields_default() {
        let conn = test_conn();
        let dao = StateDao::new(&conn);

        let state = dao.get(0).unwrap();
        assert_eq!(state.pts, 1);
        assert!(state.qts.is_none());
        assert!(state.seq.is_none());
        assert!((utils::now_ts() - state.date).abs() <= 2);

        // 默认值不落库
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM state", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn update_then_get_roundtrip() {
        let conn = test_conn();
        let dao = StateDao::new(&conn);

        dao.update(0, 42, Some(1000), Some(7), Some(3)).unwrap();
        let state = dao.get(0).unwrap();
        assert_eq!(
            state,
            UpdateState { id: 0, pts: 42, date: 1000, qts: Some(7), seq: Some(3) }
        );
    }

    #[test]
    fn update_without_date_uses_now() {
        let conn = test_conn();
        let dao = StateDao::new(&conn);

        dao.update(0, 5, None, None, None).unwrap();
        let state = dao.get(0).unwrap();
        assert!((utils::now_ts() - state.date).abs() <= 2);
    }

    #[test]
    fn reset_touches_only_pts() {
        let conn = test_conn();
        let dao = StateDao::new(&conn);

        dao.update(0, 42, Some(1000), Some(7), Some(3)).unwrap();
        dao.reset(0).unwrap();
        let state = dao.get(0).unwrap();
        assert_eq!(
            state,
            UpdateState { id: 0, pts: 1, date: 1000, qts: Some(7), seq: Some(3) }
        );

        // 幂等，缺行也不报错
        dao.reset(0).unwrap();
        dao.reset(99).unwrap();
    }
}
