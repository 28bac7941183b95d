//! pqstore CLI — residual 持久化、检查与重新评估

mod docs;
mod encode_cmd;
mod eval_cmd;
mod inspect_cmd;
mod run_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 默认的 residual 文件名
const DEFAULT_RESIDUAL_FILE: &str = "partial_queries";

#[derive(Parser)]
#[command(name = "pqstore", about = "Residual policy store CLI", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 将 residual query 与 support modules 编码写入文件
    Encode {
        /// residual query 表达式（可重复，按顺序组成合取查询）
        #[arg(short, long, required = true)]
        query: Vec<String>,
        /// support module 文件路径（可重复，顺序保留）
        #[arg(short, long)]
        module: Vec<String>,
        /// 输出文件路径
        #[arg(short, long, default_value = DEFAULT_RESIDUAL_FILE)]
        output: String,
        /// 目标文件已存在时失败而不是覆盖
        #[arg(long)]
        no_clobber: bool,
    },
    /// 解码并展示 residual 文件内容
    Inspect {
        /// residual 文件路径
        #[arg(short, long, default_value = DEFAULT_RESIDUAL_FILE)]
        file: String,
        /// 输出格式：text / json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// 校验 residual 文件能否完整恢复
    Validate {
        /// residual 文件路径
        #[arg(short, long, default_value = DEFAULT_RESIDUAL_FILE)]
        file: String,
    },
    /// 从 residual 文件重建 evaluator 并评估
    Eval {
        /// residual 文件路径
        #[arg(short, long, default_value = DEFAULT_RESIDUAL_FILE)]
        file: String,
        /// input 文档（JSON 文件）
        #[arg(short, long)]
        input: Option<String>,
        /// input 文档（JSON 字符串）
        #[arg(long, conflicts_with = "input")]
        input_json: Option<String>,
        /// data 文档（JSON 文件）
        #[arg(short, long)]
        data: Option<String>,
        /// 输出格式：text / json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// 原始策略评估 → residual 持久化 → 恢复 → 重新评估，并比较两次结果
    Run {
        /// 策略文件路径（默认读取 PQS_POLICY_PATH，或 policy/authz.rego）
        #[arg(long)]
        policy: Option<PathBuf>,
        /// 原始查询（默认读取 PQS_QUERY，或 data.authz.allow）
        #[arg(long)]
        query: Option<String>,
        /// input 文档（JSON 文件）
        #[arg(short, long)]
        input: Option<String>,
        /// input 文档（JSON 字符串）
        #[arg(long, conflicts_with = "input")]
        input_json: Option<String>,
        /// 原始评估使用的 data 文档（JSON 文件）
        #[arg(short, long)]
        data: Option<String>,
        /// partial evaluation 得到的 residual query 表达式
        #[arg(long, required = true)]
        residual_query: Vec<String>,
        /// partial evaluation 得到的 support module 文件
        #[arg(long)]
        support: Vec<String>,
        /// residual 文件路径
        #[arg(short, long, default_value = DEFAULT_RESIDUAL_FILE)]
        output: String,
        /// 目标文件已存在时失败而不是覆盖
        #[arg(long)]
        no_clobber: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = if cli.verbose { "pqs=debug" } else { "pqs=info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            query,
            module,
            output,
            no_clobber,
        } => encode_cmd::run(query, module, output, no_clobber),
        Commands::Inspect { file, format } => inspect_cmd::run(file, format),
        Commands::Validate { file } => inspect_cmd::validate(file),
        Commands::Eval {
            file,
            input,
            input_json,
            data,
            format,
        } => eval_cmd::run(file, input, input_json, data, format),
        Commands::Run {
            policy,
            query,
            input,
            input_json,
            data,
            residual_query,
            support,
            output,
            no_clobber,
        } => run_cmd::run(run_cmd::RunArgs {
            policy,
            query,
            input,
            input_json,
            data,
            residual_query,
            support,
            output,
            no_clobber,
        }),
    }
}
