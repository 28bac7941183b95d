use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// 解析失败的对象：某个 support module 或 residual query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTarget {
    Module(String),
    Query,
}

impl fmt::Display for ParseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTarget::Module(name) => write!(f, "module '{}'", name),
            ParseTarget::Query => write!(f, "residual query"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResidualError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("parse error in {target}: {message}")]
    Parse { target: ParseTarget, message: String },

    #[error("i/o error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compile error: {0}")]
    Compile(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),
}

impl ResidualError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResidualError::Io {
            path: path.into(),
            source,
        }
    }

    /// 出错阶段名称，用于诊断输出
    pub fn stage(&self) -> &'static str {
        match self {
            ResidualError::Encoding(_) => "encode",
            ResidualError::Decoding(_) => "decode",
            ResidualError::Parse { .. } => "parse",
            ResidualError::Io { .. } => "io",
            ResidualError::Compile(_) => "compile",
            ResidualError::Evaluation(_) => "evaluate",
        }
    }
}
