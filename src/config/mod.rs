//! # 配置模块
//!
//! YAML 配置文件反序列化为类型化的 `ClientConfig`，缺失的键使用内置默认值。
//!
//! ## 依赖关系
//! - 被 `client/`, `batch/`, `commands/` 使用
//! - 子模块: client, loader

pub mod client;
pub mod loader;

pub use client::ClientConfig;
