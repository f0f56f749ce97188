//! # 客户端配置
//!
//! 切片管理 API 与批量执行器的配置项。
//!
//! ## 依赖关系
//! - 被 `config/loader.rs` 反序列化
//! - 被 `client/`, `batch/` 和 `commands/` 使用

use serde::Deserialize;
use std::time::Duration;

/// 指定的“其他”客户端类型：该类型下节点名不追加后缀
pub const CLIENT_TYPE_OTHER: &str = "other";

pub const DEFAULT_POOL_SIZE: usize = 50;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SEC: u64 = 30;

/// 客户端配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub batch: BatchConfig,
}

/// 切片管理 API 服务端
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_uri: String,
    pub connection_timeout_sec: u64,
    pub read_timeout_sec: u64,
    /// 源组件名（客户端类型）
    pub src_component_name: String,
    pub dummy_invoker: DummyInvokerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_uri: "http://127.0.0.1:8080/DEMO".to_string(),
            connection_timeout_sec: 600,
            read_timeout_sec: 600,
            src_component_name: "hitachi".to_string(),
            dummy_invoker: DummyInvokerConfig::default(),
        }
    }
}

/// 内存后端
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DummyInvokerConfig {
    pub enabled: bool,
    /// 每次调用的人工延迟
    pub latency_ms: u64,
}

impl Default for DummyInvokerConfig {
    fn default() -> Self {
        DummyInvokerConfig {
            enabled: true,
            latency_ms: 0,
        }
    }
}

/// 批量执行器
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 每个批次的 worker 数，0 表示 CPU 核数
    pub pool_size: usize,
    /// 拆除线程池时等待未完成任务的上限
    pub shutdown_timeout_sec: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            pool_size: DEFAULT_POOL_SIZE,
            shutdown_timeout_sec: DEFAULT_SHUTDOWN_TIMEOUT_SEC,
        }
    }
}

impl ClientConfig {
    /// 是否为“其他”客户端类型
    pub fn is_other_client(&self) -> bool {
        self.server.src_component_name == CLIENT_TYPE_OTHER
    }

    pub fn dummy_latency(&self) -> Duration {
        Duration::from_millis(self.server.dummy_invoker.latency_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.batch.shutdown_timeout_sec)
    }
}
