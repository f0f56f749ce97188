//! # 批量处理模块
//!
//! 切片批量操作引擎。
//!
//! ## 功能
//! - 生成创建/更新/删除请求
//! - 把请求包装为操作任务
//! - 有界并发执行并汇总结果
//! - 三个批量工作流入口
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `rayon` 线程池与 `crossbeam` 通道并行执行
//! - 使用 `indicatif` 显示进度
//! - 子模块: factory, task, executor, workflows

pub mod executor;
pub mod factory;
pub mod task;
pub mod workflows;

pub use executor::{BatchExecutor, BatchReport, BatchResult, CancelToken};
pub use factory::RequestFactory;
pub use workflows::BatchWorkflows;
