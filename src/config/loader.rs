//! # 配置加载
//!
//! 从 YAML 文件加载 `ClientConfig`。
//!
//! ## 规则
//! - 未指定文件或文件不存在：记录日志并使用默认值
//! - 文件存在但无法读取：记录警告并使用默认值
//! - 文件内容无法解析：返回 `Config` 错误
//! - 空文件等同于全部使用默认值
//!
//! ## 依赖关系
//! - 使用 `config/client.rs`
//! - 使用 `serde_yaml` 反序列化
//! - 被 `commands/run.rs` 调用

use super::client::ClientConfig;
use crate::error::{Result, SliceBatchError};

use std::fs;
use std::path::Path;

impl ClientConfig {
    /// 从 YAML 文本解析，缺失的键使用默认值
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let parsed: Option<ClientConfig> = serde_yaml::from_str(text)
            .map_err(|e| SliceBatchError::Config(format!("Failed to parse config file: {}", e)))?;
        Ok(parsed.unwrap_or_default())
    }

    /// 加载 `path` 指向的配置文件
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            tracing::debug!("no config file specified, using defaults");
            return Ok(Self::default());
        };

        if !path.is_file() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_yaml_str(&content)?;
                tracing::info!(path = %path.display(), "loaded config file");
                Ok(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config file can not be loaded");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ClientConfig::from_yaml_str(
            "server:\n  base_uri: \"http://host:9/DEMO\"\n  dummy_invoker:\n    latency_ms: 25\nbatch:\n  pool_size: 8\n",
        )
        .unwrap();

        assert_eq!(config.server.base_uri, "http://host:9/DEMO");
        assert_eq!(config.dummy_latency(), Duration::from_millis(25));
        assert!(config.server.dummy_invoker.enabled);
        assert_eq!(config.batch.pool_size, 8);
        assert_eq!(config.batch.shutdown_timeout_sec, 30);
        assert_eq!(config.server.src_component_name, "hitachi");
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(ClientConfig::from_yaml_str("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let example = include_str!("../../config/slice-batch.example.yaml");
        assert_eq!(
            ClientConfig::from_yaml_str(example).unwrap(),
            ClientConfig::default()
        );
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let err = ClientConfig::from_yaml_str("batch:\n  pool_size: many\n").unwrap_err();
        assert!(matches!(err, SliceBatchError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:").unwrap();
        writeln!(file, "  src_component_name: other").unwrap();
        writeln!(file, "batch:").unwrap();
        writeln!(file, "  shutdown_timeout_sec: 5").unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert!(config.is_other_client());
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.batch.pool_size, 50);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
