//! 通用工具 - 时间与 peer id 编码

/// 频道 peer id 编码基数：存储层的频道 id 形如 -100xxxxxxxxxx
pub const MAX_CHANNEL_ID: i64 = -1_000_000_000_000;

/// 当前 Unix 时间（秒，UTC）
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 从存储层 peer id 还原频道调用用的 channel_id
///
/// 例：peer id -1001234567890 → channel_id 1234567890
pub fn get_channel_id(peer_id: i64) -> i64 {
    MAX_CHANNEL_ID - peer_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_encoding() {
        assert_eq!(get_channel_id(-1_001_234_567_890), 1_234_567_890);
        assert_eq!(get_channel_id(MAX_CHANNEL_ID - 1), 1);
    }

    #[test]
    fn now_ts_is_recent() {
        let t = now_ts();
        // 2026 年之后、不离谱的未来之前
        assert!(t > 1_750_000_000);
    }
}
