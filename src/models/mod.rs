//! # 数据模型模块
//!
//! 定义与切片管理 API 交换的切片与流数据模型。
//!
//! ## 依赖关系
//! - 被 `batch/`, `client/` 和 `commands/` 使用
//! - 子模块: slice

pub mod slice;

pub use slice::{FlowOperation, FlowRecord, SliceRecord};
