use thiserror::Error;
use std::fmt;

use super::transport::Classification;

/// 解码流水线的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// 以太网头部
    Ethernet,
    /// IP头部
    Ip,
    /// 传输层头部
    Transport,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStage::Ethernet => write!(f, "ethernet"),
            DecodeStage::Ip => write!(f, "ip"),
            DecodeStage::Transport => write!(f, "transport"),
        }
    }
}

/// 单帧解码错误，只影响当前帧，不会中止抓包
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// 缓冲区比以太网头部还短
    #[error("数据帧长度不足: 需要 {required} 字节，实际 {actual} 字节")]
    TruncatedFrame {
        required: usize,
        actual: usize,
    },

    /// IP头部声明的长度无效或超出剩余数据
    #[error("IP头部格式错误: 头部长度 {header_length} 字节，剩余 {available} 字节")]
    MalformedHeader {
        header_length: usize,
        available: usize,
    },

    /// 传输层头部所需字节超过剩余数据
    #[error("{classification} 头部被截断: 需要 {required} 字节，剩余 {available} 字节")]
    TruncatedHeader {
        classification: Classification,
        required: usize,
        available: usize,
    },
}

impl DecodeError {
    /// 出错所在的阶段
    pub fn stage(&self) -> DecodeStage {
        match self {
            DecodeError::TruncatedFrame { .. } => DecodeStage::Ethernet,
            DecodeError::MalformedHeader { .. } => DecodeStage::Ip,
            DecodeError::TruncatedHeader { .. } => DecodeStage::Transport,
        }
    }

    /// 是否已经完成了IP层分类（即已计入协议统计）
    pub fn is_classified(&self) -> bool {
        matches!(self, DecodeError::TruncatedHeader { .. })
    }
}

/// 结果类型别名
pub type DecodeResult<T> = Result<T, DecodeError>;
