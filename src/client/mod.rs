//! # 切片管理 API 客户端
//!
//! 定义批量引擎所依赖的外部协作者接口 `SliceDataManager`，
//! 以及根据配置选择后端实现的工厂函数。
//!
//! ## 约定
//! - 实现必须可以被多个 worker 并发调用 (`Send + Sync`)
//! - 所有调用可能返回 `ClientError::Client` 或 `ClientError::Nbi`
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `commands/` 使用
//! - 子模块: memory（内存后端，对应 dummy invoker）

pub mod memory;

pub use memory::InMemorySliceDataManager;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, SliceBatchError};
use crate::models::SliceRecord;

use std::sync::Arc;

/// 切片管理 API
#[cfg_attr(test, mockall::automock)]
pub trait SliceDataManager: Send + Sync {
    /// 创建切片，返回分配了 ID 的完整记录
    fn create_slice(&self, slice: &SliceRecord) -> std::result::Result<SliceRecord, ClientError>;

    /// 按 ID 更新切片
    fn update_slice(&self, slice: &SliceRecord) -> std::result::Result<SliceRecord, ClientError>;

    /// 按 ID 删除切片
    fn delete_slice(&self, slice: &SliceRecord) -> std::result::Result<SliceRecord, ClientError>;

    /// 按 ID 读取切片（包含流）
    fn read_slice(&self, slice: &SliceRecord) -> std::result::Result<SliceRecord, ClientError>;

    /// 列出所有切片摘要（至少包含 ID 和名称）
    ///
    /// `Ok(None)` 表示服务端没有返回列表，与空列表不同。
    fn list_slices(&self) -> std::result::Result<Option<Vec<SliceRecord>>, ClientError>;
}

/// 根据配置创建切片管理 API 后端
pub fn connect(config: &ClientConfig) -> Result<Arc<dyn SliceDataManager>> {
    if config.server.dummy_invoker.enabled {
        tracing::info!(
            latency_ms = config.server.dummy_invoker.latency_ms,
            "using in-memory slice backend"
        );
        return Ok(Arc::new(
            InMemorySliceDataManager::new().with_latency(config.dummy_latency()),
        ));
    }

    Err(SliceBatchError::Config(format!(
        "no remote backend available for '{}'; set server.dummy_invoker.enabled: true",
        config.server.base_uri
    )))
}
