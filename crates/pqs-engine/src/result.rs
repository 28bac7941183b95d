//! 查询结果集

use std::fmt;

use pqs_common::ResidualError;
use serde::Serialize;
use serde_json::Value as Json;

/// 一行结果：每个查询表达式的值与变量绑定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub expressions: Vec<Json>,
    pub bindings: Json,
}

impl ResultRow {
    /// 该行的判定结果
    ///
    /// 任一表达式为 `false` 时整行不成立（regorus 会保留失败表达式的 `false`），
    /// 返回 `None`；否则取最后一个表达式的值。
    pub fn decision(&self) -> Option<&Json> {
        if self.expressions.iter().any(|e| *e == Json::Bool(false)) {
            return None;
        }
        self.expressions.last()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 第一行第一个表达式的值
    pub fn first_value(&self) -> Option<&Json> {
        self.rows.first().and_then(|r| r.expressions.first())
    }

    /// 成立的行的判定值，按行序
    pub fn decisions(&self) -> Vec<&Json> {
        self.rows.iter().filter_map(ResultRow::decision).collect()
    }

    /// 比较两次评估的判定
    ///
    /// 原始查询与 residual query 的文本、变量名和合取项个数通常不同，
    /// 只比较每行的判定值。
    pub fn same_values(&self, other: &ResultSet) -> bool {
        self.decisions() == other.decisions()
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

pub(crate) fn to_json(value: &regorus::Value) -> Result<Json, ResidualError> {
    if *value == regorus::Value::Undefined {
        return Ok(Json::Null);
    }
    serde_json::to_value(value)
        .map_err(|e| ResidualError::Evaluation(format!("cannot convert result value: {}", e)))
}

/// 没有变量的查询，绑定为空对象
pub(crate) fn bindings_to_json(value: &regorus::Value) -> Result<Json, ResidualError> {
    if *value == regorus::Value::Undefined {
        return Ok(Json::Object(Default::default()));
    }
    to_json(value)
}

pub(crate) fn to_rego_value(json: &Json) -> Result<regorus::Value, ResidualError> {
    regorus::Value::from_json_str(&json.to_string())
        .map_err(|e| ResidualError::Evaluation(format!("cannot convert document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(values: Vec<Json>, bindings: Json) -> ResultRow {
        ResultRow {
            expressions: values,
            bindings,
        }
    }

    #[test]
    fn test_same_values_ignores_bindings() {
        let a = ResultSet {
            rows: vec![row(vec![json!(true)], json!({}))],
        };
        let b = ResultSet {
            rows: vec![row(vec![json!(true)], json!({"x": true}))],
        };
        assert!(a.same_values(&b));
    }

    #[test]
    fn test_same_values_detects_difference() {
        let a = ResultSet {
            rows: vec![row(vec![json!(true)], json!({}))],
        };
        let b = ResultSet {
            rows: vec![row(vec![json!(false)], json!({}))],
        };
        assert!(!a.same_values(&b));
        assert!(!a.same_values(&ResultSet::default()));
    }

    #[test]
    fn test_same_values_across_conjunct_counts() {
        // 原始查询一个表达式，residual query 两个合取项
        let original = ResultSet {
            rows: vec![row(vec![json!(true)], json!({}))],
        };
        let residual = ResultSet {
            rows: vec![row(vec![json!(true), json!(true)], json!({}))],
        };
        assert!(original.same_values(&residual));

        let denied = ResultSet {
            rows: vec![row(vec![json!(false)], json!({}))],
        };
        let failed_conjunct = ResultSet {
            rows: vec![row(vec![json!(false)], json!({}))],
        };
        assert!(denied.same_values(&failed_conjunct));
        assert!(denied.same_values(&ResultSet::default()));
        assert!(!original.same_values(&failed_conjunct));
    }

    #[test]
    fn test_decision_uses_last_expression() {
        let r = row(vec![json!(true), json!("admin")], json!({}));
        assert_eq!(r.decision(), Some(&json!("admin")));
        let r = row(vec![json!(false), json!("admin")], json!({}));
        assert_eq!(r.decision(), None);
    }

    #[test]
    fn test_undefined_is_null_not_empty_object() {
        assert_eq!(to_json(&regorus::Value::Undefined).unwrap(), Json::Null);
        assert_eq!(
            bindings_to_json(&regorus::Value::Undefined).unwrap(),
            json!({})
        );

        let undefined = ResultSet {
            rows: vec![row(vec![Json::Null], json!({}))],
        };
        let empty_object = ResultSet {
            rows: vec![row(vec![json!({})], json!({}))],
        };
        assert!(!undefined.same_values(&empty_object));
    }

    #[test]
    fn test_display_is_json() {
        let rs = ResultSet {
            rows: vec![row(vec![json!(true)], json!({}))],
        };
        assert_eq!(
            rs.to_string(),
            r#"{"rows":[{"expressions":[true],"bindings":{}}]}"#
        );
        assert_eq!(rs.first_value(), Some(&json!(true)));
    }

    #[test]
    fn test_json_value_roundtrip() {
        let doc = json!({"policies": {"alice": {"effect": "allow"}}, "enabled": true});
        let value = to_rego_value(&doc).unwrap();
        assert_eq!(to_json(&value).unwrap(), doc);
    }
}
