//! PQS Common — 共享类型与工具函数
//!
//! 包含 residual store 的统一错误类型与 blake3 哈希工具。

pub mod error;
pub mod hash;

/// PQS 通用错误类型
pub use error::{ParseTarget, ResidualError};
