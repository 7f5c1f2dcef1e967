use std::fmt;
use rusqlite;

#[derive(Debug)]
pub enum GramsyncError {
    SqliteError(rusqlite::Error),
    Database(String),
    Migration(String),
    IO(String),
    // Peer 解析错误 - 类型化失败，调用方可以精确匹配
    PeerNotFound(String),
    PeerExpired(String),
    InvalidPeerKind(String),
    // 远端调用失败（透传自传输层，恢复引擎遇到即终止）
    Rpc(String),
    Other(String),
}

impl fmt::Display for GramsyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GramsyncError::SqliteError(e) => write!(f, "SQLite error: {}", e),
            GramsyncError::Database(e) => write!(f, "Database error: {}", e),
            GramsyncError::Migration(e) => write!(f, "Migration error: {}", e),
            GramsyncError::IO(e) => write!(f, "IO error: {}", e),
            GramsyncError::PeerNotFound(e) => write!(f, "Peer not found: {}", e),
            GramsyncError::PeerExpired(e) => write!(f, "Peer expired: {}", e),
            GramsyncError::InvalidPeerKind(e) => write!(f, "Invalid peer kind: {}", e),
            GramsyncError::Rpc(e) => write!(f, "RPC error: {}", e),
            GramsyncError::Other(e) => write!(f, "Other error: {}", e),
        }
    }
}

impl std::error::Error for GramsyncError {}

impl From<rusqlite::Error> for GramsyncError {
    fn from(error: rusqlite::Error) -> Self {
        GramsyncError::SqliteError(error)
    }
}

impl From<std::io::Error> for GramsyncError {
    fn from(error: std::io::Error) -> Self {
        GramsyncError::IO(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GramsyncError>;
