/// 计算 blake3 哈希
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// 以小写 hex 形式输出哈希
pub fn hash_hex(hash: &[u8; 32]) -> String {
    hex::encode(hash)
}

/// 解析 hex 哈希字符串，长度不为 32 字节时返回 `None`
pub fn parse_hash_hex(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_is_deterministic() {
        let data = b"hello pqstore";
        assert_eq!(blake3_hash(data), blake3_hash(data));
        assert_ne!(blake3_hash(data), blake3_hash(b"wrong data"));
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = blake3_hash(b"residual");
        let hex = hash_hex(&hash);
        assert_eq!(hex.len(), 64);
        assert_eq!(parse_hash_hex(&hex), Some(hash));
    }

    #[test]
    fn test_parse_hash_hex_rejects_bad_input() {
        assert_eq!(parse_hash_hex("zz"), None);
        assert_eq!(parse_hash_hex("abcd"), None);
    }
}
