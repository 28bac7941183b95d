//! PQS Residual — partial evaluation 结果的数据模型与校验
//!
//! 包含：
//! - `PartialResult` / `SupportModule` 数据模型
//! - Rego 文本的词法扫描（package、顶层规则名、`data.` 引用）
//! - 基于 regorus 的可重解析校验与引用解析检查

pub mod model;
pub mod scan;
pub mod validate;

pub use model::{PartialResult, SupportModule};
pub use scan::{ModuleOutline, ScanError, data_refs, outline};
pub use validate::{validate_decoded, validate_for_encoding};
