use thiserror::Error;

use crate::storage::StorageError;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("数据未找到: {0}")]
    NotFound(String),

    #[error("备份无效: {0}")]
    InvalidBackup(String),

    #[error("没有可导出的 {0}")]
    NothingToExport(String),

    #[error("确认短语不匹配，需要输入 \"{expected}\"")]
    ConfirmationMismatch { expected: &'static str },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
