//! input / data 文档与 support module 文件的读取

use anyhow::{Context, Result};
use pqs_codec::WriteMode;
use pqs_residual::SupportModule;
use serde_json::Value as Json;

/// 读取 JSON 文档：文件路径或内联字符串，两者都未给出时返回 `None`
pub fn read_document(path: Option<&str>, inline: Option<&str>) -> Result<Option<Json>> {
    if let Some(text) = inline {
        let doc = serde_json::from_str(text)
            .with_context(|| format!("failed to parse inline JSON document '{}'", text))?;
        return Ok(Some(doc));
    }
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read JSON file '{}'", path))?;
    let doc = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse JSON from '{}'", path))?;
    Ok(Some(doc))
}

/// 按给定顺序读取 support module 文件，模块名即文件路径
pub fn read_modules(paths: &[String]) -> Result<Vec<SupportModule>> {
    paths
        .iter()
        .map(|path| -> Result<SupportModule> {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read support module '{}'", path))?;
            Ok(SupportModule::new(path.clone(), source))
        })
        .collect()
}

pub fn write_mode(no_clobber: bool) -> WriteMode {
    if no_clobber {
        WriteMode::CreateNew
    } else {
        WriteMode::Truncate
    }
}
