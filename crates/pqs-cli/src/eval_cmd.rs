//! `pqstore eval` — 从 residual 文件重建 evaluator 并评估

use anyhow::{Context, Result};
use pqs_codec::ResidualStore;
use pqs_engine::Evaluator;

use crate::docs::read_document;

/// 运行 eval 子命令
pub fn run(
    file: String,
    input: Option<String>,
    input_json: Option<String>,
    data: Option<String>,
    format: String,
) -> Result<()> {
    tracing::info!(%file, ?input, ?data, "evaluating residual");

    let input = read_document(input.as_deref(), input_json.as_deref())?;
    let data = read_document(data.as_deref(), None)?;

    let residual = ResidualStore::new(&file)
        .restore()
        .with_context(|| format!("failed to read partial queries from '{}'", file))?;

    let mut evaluator =
        Evaluator::from_partial(&residual).context("failed to compile residual modules")?;
    if let Some(data) = &data {
        evaluator = evaluator.with_data(data).context("failed to bind data")?;
    }

    let results = evaluator
        .eval(input.as_ref())
        .context("failed to evaluate residual query")?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => println!("ResultSet: {}", results),
    }
    Ok(())
}
