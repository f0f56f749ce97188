//! # 工具函数模块
//!
//! 提供美化输出、进度条、日志初始化与中断处理。
//!
//! ## 依赖关系
//! - 被 `main.rs`, `batch/` 和 `commands/` 模块使用
//! - 子模块: interrupt, logging, output, progress

pub mod interrupt;
pub mod logging;
pub mod output;
pub mod progress;
