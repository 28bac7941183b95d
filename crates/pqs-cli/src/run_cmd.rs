//! `pqstore run` — 完整往返：原始评估 → residual 持久化 → 恢复 → 重新评估

use std::path::PathBuf;

use anyhow::{Context, Result};
use pqs_codec::ResidualStore;
use pqs_engine::{EvalConfig, Evaluator};
use pqs_residual::PartialResult;

use crate::docs::{read_document, read_modules, write_mode};

/// run 子命令参数
pub struct RunArgs {
    pub policy: Option<PathBuf>,
    pub query: Option<String>,
    pub input: Option<String>,
    pub input_json: Option<String>,
    pub data: Option<String>,
    pub residual_query: Vec<String>,
    pub support: Vec<String>,
    pub output: String,
    pub no_clobber: bool,
}

/// 运行 run 子命令
pub fn run(args: RunArgs) -> Result<()> {
    let config = EvalConfig::from_env().with_overrides(args.policy, args.query);
    tracing::info!(
        policy = %config.policy_path.display(),
        query = %config.query_expression,
        output = %args.output,
        "running residual round trip"
    );

    let input = read_document(args.input.as_deref(), args.input_json.as_deref())?;
    let data = read_document(args.data.as_deref(), None)?;

    // ── 1. 原始策略评估 ──
    let mut original = Evaluator::from_config(&config).context("failed to load policy")?;
    if let Some(data) = &data {
        original = original.with_data(data).context("failed to bind data")?;
    }
    let rs1 = original
        .eval(input.as_ref())
        .context("failed to evaluate 1st")?;
    println!("1st ResultSet: {}", rs1);

    // ── 2. residual 持久化 ──
    let residual = PartialResult::new(args.residual_query, read_modules(&args.support)?);
    let store = ResidualStore::new(&args.output).with_mode(write_mode(args.no_clobber));
    store
        .save(&residual)
        .context("failed to write partial queries to file")?;

    // ── 3. 恢复并重建（空 store） ──
    let restored = store
        .restore()
        .context("failed to read partial queries from file")?;
    let rehydrated = Evaluator::from_partial(&restored).context("failed to compile 2nd")?;
    let rs2 = rehydrated
        .eval(input.as_ref())
        .context("failed to evaluate 2nd")?;
    println!("2nd ResultSet: {}", rs2);

    // ── 4. 比较 ──
    if rs1.same_values(&rs2) {
        println!("Residual round trip matches original evaluation");
        Ok(())
    } else {
        eprintln!("Residual round trip does NOT match original evaluation");
        std::process::exit(1);
    }
}
