//! Residual Store：encode + persist / load + decode 的组合入口

use std::path::{Path, PathBuf};

use pqs_common::ResidualError;
use pqs_residual::PartialResult;

use crate::envelope::{decode, encode};
use crate::storage::{WriteMode, load, persist};

/// 绑定到单个文件的 residual store
///
/// 单写者、单读者；不对并发访问加锁。
#[derive(Debug, Clone)]
pub struct ResidualStore {
    path: PathBuf,
    mode: WriteMode,
}

impl ResidualStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// 编码并写入文件，返回写入的字节数
    pub fn save(&self, result: &PartialResult) -> Result<usize, ResidualError> {
        let bytes = encode(result)?;
        persist(&bytes, &self.path, self.mode)?;
        Ok(bytes.len())
    }

    /// 读取并解码
    pub fn restore(&self) -> Result<PartialResult, ResidualError> {
        let bytes = load(&self.path)?;
        decode(&bytes)
    }
}
