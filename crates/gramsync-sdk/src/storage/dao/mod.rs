//! 数据访问层 (DAO) - 每张表一个专门的操作模块
//!
//! DAO 只做行级读写，不做业务判断（TTL 校验、InputPeer 构造在 storage 门面层）。

pub mod peer;
pub mod session;
pub mod state;

pub use peer::{PeerDao, PeerRow};
pub use session::SessionDao;
pub use state::StateDao;
