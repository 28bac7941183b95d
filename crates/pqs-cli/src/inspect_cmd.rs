//! `pqstore inspect` / `pqstore validate` — 解码 residual 文件

use anyhow::{Context, Result};
use pqs_codec::{ResidualStore, content_hash};
use pqs_common::hash::hash_hex;
use serde_json::json;

/// 运行 inspect 子命令
pub fn run(file: String, format: String) -> Result<()> {
    tracing::info!(%file, %format, "inspecting residual");

    let residual = ResidualStore::new(&file)
        .restore()
        .with_context(|| format!("failed to read partial queries from '{}'", file))?;
    let hash = hash_hex(&content_hash(&residual));

    match format.as_str() {
        "json" => {
            let modules: Vec<_> = residual
                .modules
                .iter()
                .map(|m| {
                    let outline = pqs_residual::outline(&m.source).ok();
                    json!({
                        "name": m.name,
                        "package": outline.as_ref().map(|o| o.package_path()),
                        "rules": outline.map(|o| o.rules.into_iter().collect::<Vec<_>>()),
                        "source": m.source,
                    })
                })
                .collect();
            let output = json!({
                "file": file,
                "content_hash": hash,
                "query": residual.query,
                "modules": modules,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            println!("Residual: {}", file);
            println!("  Content hash: {}", hash);
            println!("  Query: {}", residual.query_text());
            println!("  Modules ({}):", residual.modules.len());
            for (i, m) in residual.modules.iter().enumerate() {
                match pqs_residual::outline(&m.source) {
                    Ok(o) => println!(
                        "    [{}] {} (package {}, rules: {})",
                        i,
                        m.name,
                        o.package_path(),
                        o.rules.iter().cloned().collect::<Vec<_>>().join(", ")
                    ),
                    Err(_) => println!("    [{}] {}", i, m.name),
                }
            }
        }
    }
    Ok(())
}

/// 运行 validate 子命令：能解码即合法
pub fn validate(file: String) -> Result<()> {
    match ResidualStore::new(&file).restore() {
        Ok(residual) => {
            println!(
                "Residual is valid ({} modules)",
                residual.modules.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Residual validation failed at {} stage: {}", e.stage(), e);
            std::process::exit(1);
        }
    }
}
