//! `pqstore encode` — residual 编码并写入文件

use anyhow::{Context, Result};
use pqs_codec::ResidualStore;
use pqs_residual::PartialResult;

use crate::docs::{read_modules, write_mode};

/// 运行 encode 子命令
pub fn run(
    query: Vec<String>,
    modules: Vec<String>,
    output: String,
    no_clobber: bool,
) -> Result<()> {
    tracing::info!(?query, ?modules, %output, no_clobber, "encoding residual");

    let modules = read_modules(&modules)?;
    let residual = PartialResult::new(query, modules);

    let store = ResidualStore::new(&output).with_mode(write_mode(no_clobber));
    let bytes = store
        .save(&residual)
        .with_context(|| format!("failed to write partial queries to '{}'", output))?;

    println!(
        "Residual written to {} ({} modules, {} bytes)",
        output,
        residual.modules.len(),
        bytes
    );
    Ok(())
}
