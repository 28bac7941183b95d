//! Residual 校验：PartialResult 能否安全地持久化并恢复
//!
//! 完整流程：
//! 1. 结构检查（查询非空、模块名唯一、源码非空）
//! 2. 每个模块独立交给 regorus 解析，并扫描 package / 规则名
//! 3. 查询中的 `data.` 引用必须能由持久化的模块解析
//! 4. 所有模块装入同一 engine 后查询必须能被解析

use std::collections::HashSet;

use pqs_common::{ParseTarget, ResidualError};

use crate::model::PartialResult;
use crate::scan::{ModuleOutline, data_refs, outline};

/// 校验失败的原因，按调用方向（编码 / 解码）映射为不同的错误类型
#[derive(Debug, Clone, PartialEq, Eq)]
enum Violation {
    Malformed(String),
    Module { name: String, message: String },
    Query(String),
    Unresolved(String),
}

impl Violation {
    fn describe(&self) -> String {
        match self {
            Violation::Malformed(msg) => msg.clone(),
            Violation::Module { name, message } => {
                format!("module '{}' does not re-parse: {}", name, message)
            }
            Violation::Query(msg) => format!("residual query does not re-parse: {}", msg),
            Violation::Unresolved(msg) => msg.clone(),
        }
    }
}

/// 编码前校验：任何失败都是 `ResidualError::Encoding`
pub fn validate_for_encoding(result: &PartialResult) -> Result<(), ResidualError> {
    check(result).map_err(|v| ResidualError::Encoding(v.describe()))
}

/// 解码后校验：文本无法重解析时返回 `ResidualError::Parse`，其余为 `ResidualError::Decoding`
pub fn validate_decoded(result: &PartialResult) -> Result<(), ResidualError> {
    check(result).map_err(|v| match v {
        Violation::Module { name, message } => ResidualError::Parse {
            target: ParseTarget::Module(name),
            message,
        },
        Violation::Query(message) => ResidualError::Parse {
            target: ParseTarget::Query,
            message,
        },
        other => ResidualError::Decoding(other.describe()),
    })
}

fn check(result: &PartialResult) -> Result<(), Violation> {
    check_structure(result)?;
    let outlines = check_modules(result)?;
    check_query_references(result, &outlines)?;
    check_module_references(result, &outlines)?;
    check_query_parses(result)?;

    tracing::debug!(
        modules = result.modules.len(),
        conjuncts = result.query.len(),
        "residual validated"
    );
    Ok(())
}

// ============================================================
// Structure
// ============================================================

fn check_structure(result: &PartialResult) -> Result<(), Violation> {
    if result.query.is_empty() {
        return Err(Violation::Malformed("residual query is empty".to_string()));
    }
    if let Some(i) = result.query.iter().position(|e| e.trim().is_empty()) {
        return Err(Violation::Malformed(format!(
            "residual query expression {} is blank",
            i
        )));
    }

    let mut seen = HashSet::new();
    for (i, module) in result.modules.iter().enumerate() {
        if module.name.trim().is_empty() {
            return Err(Violation::Malformed(format!(
                "support module {} has an empty name",
                i
            )));
        }
        if !seen.insert(module.name.as_str()) {
            return Err(Violation::Malformed(format!(
                "duplicate support module name '{}'",
                module.name
            )));
        }
        if module.source.trim().is_empty() {
            return Err(Violation::Malformed(format!(
                "support module '{}' has empty source",
                module.name
            )));
        }
    }
    Ok(())
}

// ============================================================
// Modules
// ============================================================

/// Parse every module on its own engine so a failure names exactly one module.
fn check_modules(result: &PartialResult) -> Result<Vec<ModuleOutline>, Violation> {
    let mut outlines = Vec::with_capacity(result.modules.len());
    for module in &result.modules {
        let mut engine = regorus::Engine::new();
        engine
            .add_policy(module.name.clone(), module.source.clone())
            .map_err(|e| Violation::Module {
                name: module.name.clone(),
                message: e.to_string(),
            })?;

        let o = outline(&module.source).map_err(|e| Violation::Module {
            name: module.name.clone(),
            message: e.to_string(),
        })?;
        outlines.push(o);
    }
    Ok(outlines)
}

fn render_ref(path: &[String]) -> String {
    if path.is_empty() {
        "data".to_string()
    } else {
        format!("data.{}", path.join("."))
    }
}

fn resolved(outlines: &[ModuleOutline], path: &[String]) -> bool {
    outlines.iter().any(|o| o.resolves(path))
}

// ============================================================
// References
// ============================================================

/// Every `data.` reference in the query must resolve against the persisted modules.
fn check_query_references(
    result: &PartialResult,
    outlines: &[ModuleOutline],
) -> Result<(), Violation> {
    let refs = data_refs(&result.query_text()).map_err(|e| Violation::Query(e.to_string()))?;
    for path in &refs {
        if !resolved(outlines, path) {
            return Err(Violation::Unresolved(format!(
                "residual query references undefined document '{}'",
                render_ref(path)
            )));
        }
    }
    Ok(())
}

/// Module-to-module references inside the residual namespace must resolve.
///
/// References outside every persisted package root are base data supplied at
/// evaluation time and are only logged.
fn check_module_references(
    result: &PartialResult,
    outlines: &[ModuleOutline],
) -> Result<(), Violation> {
    let roots: HashSet<&str> = outlines
        .iter()
        .filter_map(|o| o.package.first().map(String::as_str))
        .collect();

    for module in &result.modules {
        let refs = data_refs(&module.source).map_err(|e| Violation::Module {
            name: module.name.clone(),
            message: e.to_string(),
        })?;
        for path in &refs {
            if resolved(outlines, path) {
                continue;
            }
            let in_namespace = path
                .first()
                .is_some_and(|root| roots.contains(root.as_str()));
            if in_namespace {
                return Err(Violation::Unresolved(format!(
                    "module '{}' references undefined document '{}'",
                    module.name,
                    render_ref(path)
                )));
            }
            tracing::debug!(
                module = %module.name,
                reference = %render_ref(path),
                "reference treated as base data"
            );
        }
    }
    Ok(())
}

// ============================================================
// Query
// ============================================================

/// regorus 没有独立的查询解析入口：在不绑定 input / data 的 engine 上
/// 试运行查询，未定义的值只会产生空结果，语法错误则直接报错。
fn check_query_parses(result: &PartialResult) -> Result<(), Violation> {
    let mut engine = regorus::Engine::new();
    for module in &result.modules {
        engine
            .add_policy(module.name.clone(), module.source.clone())
            .map_err(|e| Violation::Module {
                name: module.name.clone(),
                message: e.to_string(),
            })?;
    }
    engine
        .eval_query(result.query_text(), false)
        .map_err(|e| Violation::Query(e.to_string()))?;
    Ok(())
}
