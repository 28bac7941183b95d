//! 评估配置：策略文件路径与查询表达式
//!
//! 显式传入，不使用进程级全局状态。

use std::path::PathBuf;

/// 默认策略文件路径
pub const DEFAULT_POLICY_PATH: &str = "policy/authz.rego";
/// 默认查询
pub const DEFAULT_QUERY: &str = "data.authz.allow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    pub policy_path: PathBuf,
    pub query_expression: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            policy_path: PathBuf::from(DEFAULT_POLICY_PATH),
            query_expression: DEFAULT_QUERY.to_string(),
        }
    }
}

impl EvalConfig {
    pub fn new(policy_path: impl Into<PathBuf>, query_expression: impl Into<String>) -> Self {
        Self {
            policy_path: policy_path.into(),
            query_expression: query_expression.into(),
        }
    }

    /// 从环境变量读取配置
    ///
    /// `PQS_POLICY_PATH` / `PQS_QUERY`，未设置时使用默认值。
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            policy_path: std::env::var("PQS_POLICY_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or(defaults.policy_path),
            query_expression: std::env::var("PQS_QUERY").unwrap_or(defaults.query_expression),
        }
    }

    /// 用命令行参数覆盖（`None` 保持原值）
    pub fn with_overrides(mut self, policy_path: Option<PathBuf>, query: Option<String>) -> Self {
        if let Some(path) = policy_path {
            self.policy_path = path;
        }
        if let Some(query) = query {
            self.query_expression = query;
        }
        self
    }
}
