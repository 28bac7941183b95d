//! 单文件持久化
//!
//! 文件句柄在函数作用域内打开并在任何返回路径上关闭（drop）。
//! 覆盖语义由 [`WriteMode`] 显式给出，不依赖默认行为。

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use pqs_common::ResidualError;

/// 写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// 文件存在时截断并覆盖全部内容，不存在时创建
    #[default]
    Truncate,
    /// 只创建新文件；文件已存在时返回 `ResidualError::Io`（`AlreadyExists`）
    CreateNew,
}

/// Write `bytes` to `path` and fsync before returning.
pub fn persist(bytes: &[u8], path: &Path, mode: WriteMode) -> Result<(), ResidualError> {
    let mut options = OpenOptions::new();
    options.write(true);
    match mode {
        WriteMode::Truncate => {
            options.create(true).truncate(true);
        }
        WriteMode::CreateNew => {
            options.create_new(true);
        }
    }

    let mut file = options
        .open(path)
        .map_err(|e| ResidualError::io(path, e))?;
    file.write_all(bytes)
        .map_err(|e| ResidualError::io(path, e))?;
    file.sync_all().map_err(|e| ResidualError::io(path, e))?;

    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        ?mode,
        "residual persisted"
    );
    Ok(())
}

/// Read the whole file at `path`.
pub fn load(path: &Path) -> Result<Vec<u8>, ResidualError> {
    let mut file = File::open(path).map_err(|e| ResidualError::io(path, e))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| ResidualError::io(path, e))?;

    tracing::info!(path = %path.display(), bytes = buf.len(), "residual loaded");
    Ok(buf)
}
