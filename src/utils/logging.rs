//! # 日志初始化
//!
//! 安装全局 `tracing` 订阅者，日志写入 stderr，stdout 留给用法说明和汇总表。
//!
//! ## 规则
//! - `RUST_LOG` 优先，其次 `--log-level`，默认 `info`
//! - `--log-json` 切换为 JSON 格式
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `tracing-subscriber`

use crate::error::{Result, SliceBatchError};

use tracing_subscriber::{fmt, EnvFilter};

/// 默认日志级别
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// 安装全局日志订阅者
pub fn init(level: &str, json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| SliceBatchError::Other(format!("failed to install tracing subscriber: {e}")))
}
