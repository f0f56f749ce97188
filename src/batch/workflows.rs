//! # 批量工作流
//!
//! 三个批量入口：批量创建、全部更新、全部删除。
//!
//! ## 流程
//! 1. 更新/删除先向服务端获取当前切片清单（前置条件）
//! 2. `RequestFactory` 生成请求 DTO
//! 3. `BatchExecutor` 并行执行并汇总结果
//!
//! 前置条件失败（清单获取失败、清单缺失、读取切片失败）会在提交任何任务之前
//! 终止整个工作流；批次内单个任务的失败只记入 `BatchReport`。
//!
//! ## 依赖关系
//! - 被 `commands/run.rs` 调用
//! - 使用 `batch/factory.rs`, `batch/task.rs`, `batch/executor.rs`
//! - 调用 `client::SliceDataManager`

use super::executor::{BatchExecutor, BatchReport, CancelToken};
use super::factory::RequestFactory;
use super::task::{OperationTask, SliceOperation};
use crate::client::SliceDataManager;
use crate::error::{Result, SliceBatchError};
use crate::models::SliceRecord;

use rand::Rng;
use std::sync::Arc;

/// 批量工作流
pub struct BatchWorkflows<R: Rng> {
    manager: Arc<dyn SliceDataManager>,
    factory: RequestFactory,
    executor: BatchExecutor,
    cancel: CancelToken,
    rng: R,
}

impl<R: Rng> BatchWorkflows<R> {
    pub fn new(
        manager: Arc<dyn SliceDataManager>,
        factory: RequestFactory,
        executor: BatchExecutor,
        rng: R,
    ) -> Self {
        BatchWorkflows {
            manager,
            factory,
            executor,
            cancel: CancelToken::new(),
            rng,
        }
    }

    /// 使用外部的中断标志
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 批量创建 `slice_count` 个切片，每个切片 `flows_per_slice` 条流
    pub fn bulk_create(
        &mut self,
        slice_count: usize,
        flows_per_slice: usize,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    ) -> Result<BatchReport> {
        tracing::info!(slice_count, flows_per_slice, ?bandwidth, ?latency, "bulk create");

        let requests = self.factory.build_create_batch(
            &mut self.rng,
            slice_count,
            flows_per_slice,
            bandwidth,
            latency,
        );

        let tasks = requests
            .into_iter()
            .map(|req| {
                let name = req.display_name().to_string();
                self.task(name, SliceOperation::Create, req)
            })
            .collect();

        self.run(tasks)
    }

    /// 用新的带宽/延迟更新所有已登记切片的全部流
    pub fn bulk_update_all(
        &mut self,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    ) -> Result<BatchReport> {
        tracing::info!(?bandwidth, ?latency, "bulk update all");

        let inventory = self.list_inventory()?;

        // 先读取全部切片，任何一次读取失败都不会留下已提交的任务
        let mut requests = Vec::with_capacity(inventory.len());
        for summary in &inventory {
            let registered = self.manager.read_slice(summary).map_err(|e| {
                SliceBatchError::precondition(
                    format!("failed to read slice '{}'", summary.display_name()),
                    Some(e),
                )
            })?;
            let update =
                self.factory
                    .build_update_batch(&mut self.rng, &registered, bandwidth, latency);
            requests.push((summary.display_name().to_string(), update));
        }

        let tasks = requests
            .into_iter()
            .map(|(name, req)| self.task(name, SliceOperation::Update, req))
            .collect();

        self.run(tasks)
    }

    /// 删除所有已登记切片
    pub fn bulk_delete_all(&mut self) -> Result<BatchReport> {
        tracing::info!("bulk delete all");

        let inventory = self.list_inventory()?;

        let tasks = inventory
            .iter()
            .map(|summary| {
                let req = self.factory.build_delete_request(summary);
                self.task(summary.display_name().to_string(), SliceOperation::Delete, req)
            })
            .collect();

        self.run(tasks)
    }

    /// 获取切片清单；失败或缺失均为前置条件错误
    fn list_inventory(&self) -> Result<Vec<SliceRecord>> {
        match self.manager.list_slices() {
            Ok(Some(list)) => {
                tracing::info!(count = list.len(), "fetched slice inventory");
                Ok(list)
            }
            Ok(None) => Err(SliceBatchError::precondition("slice list is absent", None)),
            Err(e) => Err(SliceBatchError::precondition(
                "failed to list slices",
                Some(e),
            )),
        }
    }

    fn task(&self, name: String, operation: SliceOperation, req: SliceRecord) -> OperationTask {
        OperationTask::new(name, operation, req, Arc::clone(&self.manager))
    }

    fn run(&self, tasks: Vec<OperationTask>) -> Result<BatchReport> {
        let results = self.executor.run_batch(tasks, &self.cancel)?;
        let report: BatchReport = results.into_iter().collect();
        tracing::info!(
            total = report.total(),
            success = report.success,
            failed = report.failed,
            "batch finished"
        );
        Ok(report)
    }
}
