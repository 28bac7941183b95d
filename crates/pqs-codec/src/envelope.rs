//! Residual envelope（持久化格式）
//!
//! 格式（JSON）：
//! ```text
//! {
//!   "format": "pqstore/residual",
//!   "version": 1,
//!   "content_hash": "<hex blake3(canonical payload)>",
//!   "query": ["expr", ...],
//!   "modules": [{"name": "...", "source": "..."}, ...]
//! }
//! ```
//!
//! canonical payload（用于 content_hash）：
//! ```text
//! [4B num_exprs]   每个 expr:   [4B len] [len bytes]
//! [4B num_modules] 每个 module: [4B name_len] [name] [4B source_len] [source]
//! ```

use pqs_common::ResidualError;
use pqs_common::hash::{blake3_hash, hash_hex, parse_hash_hex};
use pqs_residual::{PartialResult, SupportModule, validate_decoded, validate_for_encoding};
use serde::{Deserialize, Serialize};

/// 格式标签
const FORMAT: &str = "pqstore/residual";
/// 当前版本
const VERSION: u16 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    format: String,
    version: u16,
    content_hash: String,
    query: Vec<String>,
    modules: Vec<SupportModule>,
}

// ──────────────────────────────────────────────
// 内容哈希
// ──────────────────────────────────────────────

fn write_str(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

fn canonical_payload(result: &PartialResult) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(&(result.query.len() as u32).to_le_bytes());
    for expr in &result.query {
        write_str(&mut buf, expr);
    }

    buf.extend_from_slice(&(result.modules.len() as u32).to_le_bytes());
    for module in &result.modules {
        write_str(&mut buf, &module.name);
        write_str(&mut buf, &module.source);
    }

    buf
}

/// `PartialResult` 的内容哈希（与 envelope 中的 `content_hash` 一致）
pub fn content_hash(result: &PartialResult) -> [u8; 32] {
    blake3_hash(&canonical_payload(result))
}

// ──────────────────────────────────────────────
// 编码
// ──────────────────────────────────────────────

/// 将 `PartialResult` 编码为 envelope 字节
///
/// 编码前会校验每个模块与查询都能被重新解析，且查询引用的文档都在持久化的模块中。
/// 相同输入总是产生相同字节。
pub fn encode(result: &PartialResult) -> Result<Vec<u8>, ResidualError> {
    validate_for_encoding(result)?;

    let hash = content_hash(result);
    let envelope = Envelope {
        format: FORMAT.to_string(),
        version: VERSION,
        content_hash: hash_hex(&hash),
        query: result.query.clone(),
        modules: result.modules.clone(),
    };

    let bytes = serde_json::to_vec_pretty(&envelope)
        .map_err(|e| ResidualError::Encoding(format!("cannot serialize envelope: {}", e)))?;

    tracing::debug!(
        modules = result.modules.len(),
        bytes = bytes.len(),
        content_hash = %envelope.content_hash,
        "residual encoded"
    );
    Ok(bytes)
}

// ──────────────────────────────────────────────
// 解码
// ──────────────────────────────────────────────

/// 从 envelope 字节解码 `PartialResult`
pub fn decode(data: &[u8]) -> Result<PartialResult, ResidualError> {
    if data.is_empty() {
        return Err(ResidualError::Decoding("empty input".to_string()));
    }

    let envelope: Envelope = serde_json::from_slice(data)
        .map_err(|e| ResidualError::Decoding(format!("malformed envelope: {}", e)))?;

    if envelope.format != FORMAT {
        return Err(ResidualError::Decoding(format!(
            "unknown format tag: expected '{}', got '{}'",
            FORMAT, envelope.format
        )));
    }
    if envelope.version != VERSION {
        return Err(ResidualError::Decoding(format!(
            "unsupported version: {}",
            envelope.version
        )));
    }

    let expected = parse_hash_hex(&envelope.content_hash).ok_or_else(|| {
        ResidualError::Decoding(format!(
            "invalid content hash '{}'",
            envelope.content_hash
        ))
    })?;

    let result = PartialResult {
        query: envelope.query,
        modules: envelope.modules,
    };

    let actual = content_hash(&result);
    if actual != expected {
        return Err(ResidualError::Decoding(format!(
            "content hash mismatch: envelope says {}, payload hashes to {}",
            envelope.content_hash,
            hash_hex(&actual)
        )));
    }

    validate_decoded(&result)?;

    tracing::debug!(
        modules = result.modules.len(),
        content_hash = %envelope.content_hash,
        "residual decoded"
    );
    Ok(result)
}

// ──────────────────────────────────────────────
// 测试
// ──────────────────────────────────────────────
