//! 会话 DAO - session 表（单行，id 恒为 0）
//!
//! 每个会话属性一对显式类型化存取器，不做任何运行时按名分发。

use rusqlite::{params, Connection};

use crate::error::Result;

/// session 表唯一行的主键
const SESSION_ROW: i64 = 0;

pub struct SessionDao<'a> {
    conn: &'a Connection,
}

impl<'a> SessionDao<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn dc_id(&self) -> Result<i64> {
        let v = self.conn.query_row(
            "SELECT dc_id FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    pub fn set_dc_id(&self, dc_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET dc_id = ?1 WHERE id = ?2",
            params![dc_id, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn api_id(&self) -> Result<Option<i64>> {
        let v = self.conn.query_row(
            "SELECT api_id FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    pub fn set_api_id(&self, api_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET api_id = ?1 WHERE id = ?2",
            params![api_id, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn test_mode(&self) -> Result<Option<bool>> {
        let v: Option<i64> = self.conn.query_row(
            "SELECT test_mode FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v.map(|x| x != 0))
    }

    pub fn set_test_mode(&self, test_mode: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET test_mode = ?1 WHERE id = ?2",
            params![test_mode as i64, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn auth_key(&self) -> Result<Option<Vec<u8>>> {
        let v = self.conn.query_row(
            "SELECT auth_key FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    pub fn set_auth_key(&self, auth_key: &[u8]) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET auth_key = ?1 WHERE id = ?2",
            params![auth_key, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn date(&self) -> Result<i64> {
        let v = self.conn.query_row(
            "SELECT date FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    pub fn set_date(&self, date: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET date = ?1 WHERE id = ?2",
            params![date, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn user_id(&self) -> Result<Option<i64>> {
        let v = self.conn.query_row(
            "SELECT user_id FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v)
    }

    pub fn set_user_id(&self, user_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET user_id = ?1 WHERE id = ?2",
            params![user_id, SESSION_ROW],
        )?;
        Ok(())
    }

    pub fn is_bot(&self) -> Result<Option<bool>> {
        let v: Option<i64> = self.conn.query_row(
            "SELECT is_bot FROM session WHERE id = ?1",
            params![SESSION_ROW],
            |row| row.get(0),
        )?;
        Ok(v.map(|x| x != 0))
    }

    pub fn set_is_bot(&self, is_bot: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE session SET is_bot = ?1 WHERE id = ?2",
            params![is_bot as i64, SESSION_ROW],
        )?;
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
    fn session_row_defaults() {
        let conn = test_conn();
        let dao = SessionDao::new(&conn);

        assert_eq!(dao.dc_id().unwrap(), 2);
        assert_eq!(dao.date().unwrap(), 0);
        assert!(dao.api_id().unwrap().is_none());
        assert!(dao.auth_key().unwrap().is_none());
        assert!(dao.test_mode().unwrap().is_none());
    }

    #[test]
    fn typed_accessors_roundtrip() {
        let conn = test_conn();
        let dao = SessionDao::new(&conn);

        dao.set_dc_id(4).unwrap();
        dao.set_api_id(12345).unwrap();
        dao.set_test_mode(true).unwrap();
        dao.set_auth_key(&[1, 2, 3]).unwrap();
        dao.set_user_id(777).unwrap();
        dao.set_is_bot(false).unwrap();

        assert_eq!(dao.dc_id().unwrap(), 4);
        assert_eq!(dao.api_id().unwrap(), Some(12345));
        assert_eq!(dao.test_mode().unwrap(), Some(true));
        assert_eq!(dao.auth_key().unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(dao.user_id().unwrap(), Some(777));
        assert_eq!(dao.is_bot().unwrap(), Some(false));
    }
}
