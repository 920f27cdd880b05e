use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SniffError};

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV: &str = "SNIFFER_CONFIG";

/// 报告输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub enable_payload_dump: bool,   // 是否输出负载十六进制
    pub payload_dump_limit: usize,   // 负载最多输出的字节数
    pub output_format: OutputFormat,
    pub buffer_size: usize,          // 原始套接字接收缓冲区大小
    pub poll_interval_ms: u64,       // 阻塞读取检查停止信号的间隔（毫秒）
    pub workers: usize,              // 大于1时启用并行解码，0 表示每个CPU一个线程
    pub replay_file: Option<PathBuf>, // 从pcap文件回放而不是实时抓包
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_payload_dump: false,
            payload_dump_limit: 64,
            output_format: OutputFormat::Text,
            buffer_size: 65536,
            poll_interval_ms: 200,
            workers: 1,
            replay_file: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// 读取 `SNIFFER_CONFIG` 指向的JSON文件，未设置时使用默认配置
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SniffError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| SniffError::Config(format!("配置解析失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(SniffError::Config("buffer_size 必须大于 0".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(SniffError::Config("poll_interval_ms 必须大于 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.enable_payload_dump);
        assert_eq!(config.payload_dump_limit, 64);
        assert_eq!(config.output_format, OutputFormat::Text);
        assert_eq!(config.workers, 1);
        assert!(config.replay_file.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = Config::from_json_str(r#"{"enable_payload_dump": true, "output_format": "json"}"#).unwrap();
        assert!(config.enable_payload_dump);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.buffer_size, 65536);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(Config::from_json_str(r#"{"buffer_size": 0}"#), Err(SniffError::Config(_))));
        assert!(matches!(Config::from_json_str(r#"{"output_format": "xml"}"#), Err(SniffError::Config(_))));
        assert!(matches!(Config::from_json_str("not json"), Err(SniffError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/nonexistent/sniffer.json");
        assert!(matches!(result, Err(SniffError::Config(_))));
    }
}
