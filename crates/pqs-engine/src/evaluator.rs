//! Evaluator：regorus engine + 查询

use pqs_common::ResidualError;
use pqs_residual::{PartialResult, SupportModule};
use serde_json::Value as Json;

use crate::config::EvalConfig;
use crate::result::{ResultRow, ResultSet, bindings_to_json, to_json, to_rego_value};

/// 已装载模块与数据的评估器
///
/// 每次 `eval` 在 engine 的副本上绑定 input，评估器本身可以重复使用。
#[derive(Clone)]
pub struct Evaluator {
    engine: regorus::Engine,
    query: String,
    module_names: Vec<String>,
}

impl Evaluator {
    /// 从配置中的策略文件构建
    pub fn from_config(config: &EvalConfig) -> Result<Self, ResidualError> {
        let source = std::fs::read_to_string(&config.policy_path)
            .map_err(|e| ResidualError::io(&config.policy_path, e))?;
        let module = SupportModule::new(config.policy_path.display().to_string(), source);

        tracing::info!(
            policy = %config.policy_path.display(),
            query = %config.query_expression,
            "loading policy"
        );
        Self::from_modules(&[module], &config.query_expression)
    }

    /// 从解码后的 residual 构建（包含全部 support modules）
    pub fn from_partial(result: &PartialResult) -> Result<Self, ResidualError> {
        tracing::info!(
            modules = result.modules.len(),
            "rebuilding evaluator from residual"
        );
        Self::from_modules(&result.modules, &result.query_text())
    }

    /// 装载模块并预先检查查询
    pub fn from_modules(modules: &[SupportModule], query: &str) -> Result<Self, ResidualError> {
        let mut engine = regorus::Engine::new();
        for module in modules {
            engine
                .add_policy(module.name.clone(), module.source.clone())
                .map_err(|e| {
                    ResidualError::Compile(format!("module '{}' rejected: {}", module.name, e))
                })?;
            tracing::debug!(module = %module.name, "module added");
        }

        // 在不带 input / data 的副本上试运行，提前暴露查询与规则冲突错误
        engine
            .clone()
            .eval_query(query.to_string(), false)
            .map_err(|e| ResidualError::Compile(format!("query '{}' rejected: {}", query, e)))?;

        Ok(Self {
            engine,
            query: query.to_string(),
            module_names: modules.iter().map(|m| m.name.clone()).collect(),
        })
    }

    /// 绑定数据文档（对应 store）
    pub fn with_data(mut self, data: &Json) -> Result<Self, ResidualError> {
        let value = to_rego_value(data)?;
        self.engine
            .add_data(value)
            .map_err(|e| ResidualError::Evaluation(format!("cannot add data: {}", e)))?;
        Ok(self)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn module_names(&self) -> &[String] {
        &self.module_names
    }

    /// 在给定 input 上执行查询
    pub fn eval(&self, input: Option<&Json>) -> Result<ResultSet, ResidualError> {
        let mut engine = self.engine.clone();
        if let Some(input) = input {
            engine.set_input(to_rego_value(input)?);
        }

        let results = engine
            .eval_query(self.query.clone(), false)
            .map_err(|e| ResidualError::Evaluation(e.to_string()))?;

        let mut rows = Vec::with_capacity(results.result.len());
        for r in &results.result {
            let expressions = r
                .expressions
                .iter()
                .map(|e| to_json(&e.value))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(ResultRow {
                expressions,
                bindings: bindings_to_json(&r.bindings)?,
            });
        }

        tracing::debug!(query = %self.query, rows = rows.len(), "query evaluated");
        Ok(ResultSet { rows })
    }
}
