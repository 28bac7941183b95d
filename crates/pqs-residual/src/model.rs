//! Residual 数据模型

use serde::{Deserialize, Serialize};

/// 由 partial evaluation 生成的 support module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportModule {
    /// 模块名（在同一个 `PartialResult` 内唯一）
    pub name: String,
    /// Rego 源码
    pub source: String,
}

impl SupportModule {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// 一次 partial evaluation 的结果：一个 residual query 加上它依赖的 support modules
///
/// `query` 是一个合取查询的表达式序列；`modules` 的顺序有意义，
/// 编码与解码都会原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResult {
    pub query: Vec<String>,
    pub modules: Vec<SupportModule>,
}

impl PartialResult {
    pub fn new(query: Vec<String>, modules: Vec<SupportModule>) -> Self {
        Self { query, modules }
    }

    /// 单表达式查询的便捷构造
    pub fn single(query: impl Into<String>, modules: Vec<SupportModule>) -> Self {
        Self {
            query: vec![query.into()],
            modules,
        }
    }

    /// 将表达式序列渲染为 Rego query body
    pub fn query_text(&self) -> String {
        self.query
            .iter()
            .map(|expr| expr.trim())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }

    pub fn module(&self, name: &str) -> Option<&SupportModule> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_joins_conjuncts() {
        let result = PartialResult::new(
            vec![
                " input.user == \"alice\" ".to_string(),
                "data.partial.authz.allow".to_string(),
            ],
            vec![],
        );
        assert_eq!(
            result.query_text(),
            "input.user == \"alice\"; data.partial.authz.allow"
        );
    }

    #[test]
    fn test_module_lookup_by_name() {
        let result = PartialResult::single(
            "data.a.allow",
            vec![
                SupportModule::new("a", "package a"),
                SupportModule::new("b", "package b"),
            ],
        );
        assert_eq!(result.module("b").map(|m| m.source.as_str()), Some("package b"));
        assert!(result.module("c").is_none());
        assert_eq!(result.module_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
