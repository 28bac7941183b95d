//! PQS Codec — residual 的编码、解码与持久化
//!
//! 将 `PartialResult`（residual query + 全部 support modules）编码为带版本与
//! 内容哈希的 JSON envelope，写入单个文件，并能完整恢复。

pub mod envelope;
pub mod storage;
pub mod store;

pub use envelope::{content_hash, decode, encode};
pub use storage::{WriteMode, load, persist};
pub use store::ResidualStore;
