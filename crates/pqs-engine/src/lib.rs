//! PQS Engine — 评估边界
//!
//! 从策略文件或解码后的 `PartialResult` 重建 regorus engine，
//! 绑定 input / data 并执行查询。

pub mod config;
pub mod evaluator;
pub mod result;

pub use config::EvalConfig;
pub use evaluator::Evaluator;
pub use result::{ResultRow, ResultSet};
