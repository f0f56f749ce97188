//! # 切片操作任务
//!
//! 把一个请求切片与一种远端操作绑定为一个工作单元。
//!
//! ## 依赖关系
//! - 被 `batch/executor.rs`, `batch/workflows.rs` 使用
//! - 调用 `client::SliceDataManager`

use crate::client::SliceDataManager;
use crate::error::ClientError;
use crate::models::SliceRecord;

use serde::Serialize;
use std::sync::Arc;

/// 远端操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceOperation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for SliceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SliceOperation::Create => write!(f, "create"),
            SliceOperation::Update => write!(f, "update"),
            SliceOperation::Delete => write!(f, "delete"),
        }
    }
}

/// 操作任务，由执行它的 worker 独占
pub struct OperationTask {
    name: String,
    operation: SliceOperation,
    request: SliceRecord,
    manager: Arc<dyn SliceDataManager>,
}

impl std::fmt::Debug for OperationTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationTask")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl OperationTask {
    pub fn new(
        name: impl Into<String>,
        operation: SliceOperation,
        request: SliceRecord,
        manager: Arc<dyn SliceDataManager>,
    ) -> Self {
        OperationTask {
            name: name.into(),
            operation,
            request,
            manager,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self) -> SliceOperation {
        self.operation
    }

    pub fn request(&self) -> &SliceRecord {
        &self.request
    }

    /// 执行一次远端调用，不重试
    pub fn execute(&self) -> Result<SliceRecord, ClientError> {
        let result = match self.operation {
            SliceOperation::Create => self.manager.create_slice(&self.request),
            SliceOperation::Update => self.manager.update_slice(&self.request),
            SliceOperation::Delete => self.manager.delete_slice(&self.request),
        };

        if let Err(e) = &result {
            tracing::warn!(task = %self.name, operation = %self.operation, error = %e, "failed to operate");
        }
        result
    }
}
