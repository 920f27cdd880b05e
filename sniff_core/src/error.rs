use std::result::Result as StdResult;
use thiserror::Error;

use crate::capture::ReadError;

#[derive(Debug, Error)]
pub enum SniffError {
    /// 数据帧来源无法打开（例如权限不足），在抓包开始前发生
    #[error("无法打开数据帧来源 {source_name}: {reason}")]
    Acquisition {
        source_name: String,
        reason: String,
    },

    /// 抓包过程中发生的意外读取错误
    #[error("读取数据帧失败: {0}")]
    Read(#[from] ReadError),

    #[error("输出错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("JSON序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl SniffError {
    pub fn acquisition(source_name: impl Into<String>, reason: impl ToString) -> Self {
        SniffError::Acquisition {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = StdResult<T, SniffError>;
