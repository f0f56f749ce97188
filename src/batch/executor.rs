//! # 批量执行器
//!
//! 以有界并发执行一批切片操作任务，并汇总每个任务的结果。
//!
//! ## 功能
//! - 每次 `run_batch` 创建独立的固定大小线程池，结束时拆除
//! - 先提交全部任务，再通过汇聚通道按完成顺序收集结果
//! - 单个任务失败（含 panic）只记录，不影响同批其他任务
//! - 支持调用方协作式中断
//! - 拆除时最多等待 `shutdown_timeout`，超时后放弃未完成的 worker；
//!   等待期间被中断时立即返回
//!
//! ## 依赖关系
//! - 被 `batch/workflows.rs` 调用
//! - 使用 `batch/task.rs` 中的 `OperationTask`
//! - 使用 `rayon` 线程池、`crossbeam` 通道
//! - 使用 `utils/progress.rs` 创建进度条

use super::task::{OperationTask, SliceOperation};
use crate::config::ClientConfig;
use crate::error::{BatchError, TaskError};
use crate::models::SliceRecord;
use crate::utils::progress;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use indicatif::ProgressBar;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 收集结果时检查中断标志的间隔
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 协作式中断标志
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// 单个任务的结果
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// 任务名（切片名）
    pub name: String,
    pub operation: SliceOperation,
    pub outcome: Result<SliceRecord, TaskError>,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// 批量结果统计
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 成功数量
    pub success: usize,
    /// 失败数量
    pub failed: usize,
    /// 按完成顺序排列的全部结果
    pub results: Vec<BatchResult>,
}

impl BatchReport {
    /// 合并单个任务结果
    pub fn merge(&mut self, result: BatchResult) {
        if result.is_success() {
            self.success += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

impl FromIterator<BatchResult> for BatchReport {
    fn from_iter<I: IntoIterator<Item = BatchResult>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for result in iter {
            report.merge(result);
        }
        report
    }
}

/// worker 发回的完成消息
struct Completion {
    index: usize,
    outcome: Result<SliceRecord, TaskError>,
}

/// 批量执行器
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    /// 并行 worker 数
    pool_size: usize,
    /// 拆除线程池时的等待上限
    shutdown_timeout: Duration,
    show_progress: bool,
}

impl BatchExecutor {
    /// 创建新的批量执行器，`pool_size` 为 0 时使用 CPU 核数
    pub fn new(pool_size: usize) -> Self {
        let pool_size = if pool_size == 0 {
            num_cpus::get()
        } else {
            pool_size
        };
        Self {
            pool_size,
            shutdown_timeout: Duration::from_secs(crate::config::client::DEFAULT_SHUTDOWN_TIMEOUT_SEC),
            show_progress: false,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.batch.pool_size).with_shutdown_timeout(config.shutdown_timeout())
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// 并行执行一批任务
    ///
    /// 返回的结果数与提交的任务数相同，顺序为完成顺序。
    /// 收集过程中 `cancel` 被触发时，丢弃已收集的结果并返回 `BatchError::Interrupted`。
    pub fn run_batch(
        &self,
        tasks: Vec<OperationTask>,
        cancel: &CancelToken,
    ) -> Result<Vec<BatchResult>, BatchError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let total = tasks.len();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.pool_size.min(total))
            .thread_name(|i| format!("slice-batch-{}", i))
            .build()?;

        let (tx, rx) = channel::unbounded::<Completion>();
        let abort = Arc::new(AtomicBool::new(false));
        let mut pending: Vec<Option<(String, SliceOperation)>> = Vec::with_capacity(total);

        for (index, task) in tasks.into_iter().enumerate() {
            log_slice("Request", task.name(), task.request());
            pending.push(Some((task.name().to_string(), task.operation())));

            let tx = tx.clone();
            let abort = Arc::clone(&abort);
            pool.spawn(move || {
                if abort.load(Ordering::Acquire) {
                    return;
                }
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.execute()))
                    .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())))
                    .and_then(|r| r.map_err(TaskError::from));
                // 接收端已关闭说明批次被中断，结果无需送达
                let _ = tx.send(Completion { index, outcome });
            });
        }
        drop(tx);

        tracing::debug!(total, workers = self.pool_size.min(total), "batch submitted");

        let pb = self
            .show_progress
            .then(|| progress::create_progress_bar(total as u64, "Operating"));
        let mut results = Vec::with_capacity(total);

        while results.len() < total {
            if cancel.is_cancelled() {
                abort.store(true, Ordering::Release);
                let completed = results.len();
                if let Some(pb) = &pb {
                    pb.abandon();
                }
                tracing::warn!(completed, total, "batch interrupted, tearing down worker pool");
                self.shutdown(pool, rx, cancel);
                return Err(BatchError::Interrupted { completed, total });
            }

            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(Completion { index, outcome }) => {
                    let Some((name, operation)) = pending.get_mut(index).and_then(Option::take)
                    else {
                        continue;
                    };
                    let result = BatchResult {
                        name,
                        operation,
                        outcome,
                    };
                    report_result(pb.as_ref(), &result);
                    results.push(result);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // worker 未送回结果就消失的任务，记为失败而不是丢弃
        for (name, operation) in pending.into_iter().flatten() {
            let result = BatchResult {
                name,
                operation,
                outcome: Err(TaskError::Abandoned),
            };
            report_result(pb.as_ref(), &result);
            results.push(result);
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        if !self.shutdown(pool, rx, cancel) {
            tracing::warn!(total, "interrupted while awaiting worker pool termination");
            return Err(BatchError::Interrupted {
                completed: total,
                total,
            });
        }
        Ok(results)
    }

    /// 拆除线程池：不再接收任务，等待未完成的 worker，超时后放弃
    ///
    /// 等待期间 `cancel` 被触发时立即停止等待并返回 false。
    fn shutdown(
        &self,
        pool: rayon::ThreadPool,
        rx: Receiver<Completion>,
        cancel: &CancelToken,
    ) -> bool {
        drop(pool);
        self.await_termination(&rx, cancel)
    }

    fn await_termination(&self, rx: &Receiver<Completion>, cancel: &CancelToken) -> bool {
        let deadline = Instant::now() + self.shutdown_timeout;
        loop {
            if cancel.is_cancelled() {
                return false;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(
                    timeout_secs = self.shutdown_timeout.as_secs(),
                    "worker pool did not terminate in time, abandoning outstanding tasks"
                );
                return true;
            }

            match rx.recv_timeout(CANCEL_POLL_INTERVAL.min(remaining)) {
                Ok(Completion { index, .. }) => {
                    tracing::debug!(index, "discarding result received during shutdown");
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 记录一个切片 DTO，payload 在 debug 级别以 JSON 输出
pub(crate) fn log_slice(tag: &str, name: &str, slice: &SliceRecord) {
    tracing::info!(tag, slice = name, "==== {}. slice: {}", tag, name);
    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string_pretty(slice) {
            Ok(payload) => tracing::debug!(tag, slice = name, "{}", payload),
            Err(e) => tracing::error!(error = %e, "failed to serialize slice"),
        }
    }
}

fn log_result(result: &BatchResult) {
    match &result.outcome {
        Ok(slice) => log_slice("Response", slice.name.as_deref().unwrap_or(&result.name), slice),
        Err(TaskError::Remote { cause, detail }) => {
            tracing::warn!(
                tag = "Response",
                slice = %result.name,
                operation = %result.operation,
                cause = %cause,
                detail = %detail,
                "a remote error occurs"
            );
        }
        Err(e) => {
            tracing::warn!(
                tag = "Response",
                slice = %result.name,
                operation = %result.operation,
                error = %e,
                "error occurs"
            );
        }
    }
}

fn report_result(pb: Option<&ProgressBar>, result: &BatchResult) {
    match pb {
        Some(pb) => {
            pb.suspend(|| log_result(result));
            pb.inc(1);
        }
        None => log_result(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemorySliceDataManager, MockSliceDataManager, SliceDataManager};
    use crate::error::ClientError;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    fn create_tasks(manager: &Arc<dyn SliceDataManager>, names: &[String]) -> Vec<OperationTask> {
        names
            .iter()
            .map(|n| {
                OperationTask::new(
                    n.clone(),
                    SliceOperation::Create,
                    SliceRecord::named(n.clone()),
                    Arc::clone(manager),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_batch_returns_immediately() {
        let executor = BatchExecutor::new(4);
        let started = Instant::now();
        let results = executor.run_batch(Vec::new(), &CancelToken::new()).unwrap();
        assert!(results.is_empty());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_every_task_yields_one_result() {
        let manager: Arc<dyn SliceDataManager> =
            Arc::new(InMemorySliceDataManager::new().with_latency(Duration::from_millis(5)));
        let names: Vec<String> = (0..40).map(|i| format!("slice{:08}", i)).collect();

        let executor = BatchExecutor::new(8);
        let results = executor
            .run_batch(create_tasks(&manager, &names), &CancelToken::new())
            .unwrap();

        assert_eq!(results.len(), 40);
        assert!(results.iter().all(BatchResult::is_success));
        let seen: HashSet<_> = results.iter().map(|r| r.name.clone()).collect();
        assert_eq!(seen.len(), 40);
        assert_eq!(manager.list_slices().unwrap().unwrap().len(), 40);
    }

    #[test]
    fn test_failures_do_not_abort_siblings() {
        let mut mock = MockSliceDataManager::new();
        mock.expect_create_slice().times(10).returning(|s| {
            let name = s.name.clone().unwrap_or_default();
            let idx: usize = name.trim_start_matches("slice").parse().unwrap();
            std::thread::sleep(Duration::from_millis((10 - idx as u64) * 2));
            match idx % 3 {
                0 => Err(ClientError::nbi("BadRequest", format!("rejected {}", name))),
                1 => Err(ClientError::Client("connection reset".to_string())),
                _ => Ok(SliceRecord {
                    id: Some(format!("S{}", idx)),
                    ..s.clone()
                }),
            }
        });
        let manager: Arc<dyn SliceDataManager> = Arc::new(mock);
        let names: Vec<String> = (0..10).map(|i| format!("slice{}", i)).collect();

        let results = BatchExecutor::new(4)
            .run_batch(create_tasks(&manager, &names), &CancelToken::new())
            .unwrap();
        let report: BatchReport = results.into_iter().collect();

        assert_eq!(report.total(), 10);
        // idx % 3 == 0: 0,3,6,9 ; idx % 3 == 1: 1,4,7
        assert_eq!(report.failed, 7);
        assert_eq!(report.success, 3);

        let remote: Vec<_> = report
            .failures()
            .filter(|r| matches!(r.outcome, Err(TaskError::Remote { .. })))
            .collect();
        assert_eq!(remote.len(), 4);
        for r in remote {
            match &r.outcome {
                Err(TaskError::Remote { cause, detail }) => {
                    assert_eq!(cause, "BadRequest");
                    assert_eq!(detail, &format!("rejected {}", r.name));
                }
                _ => unreachable!(),
            }
        }
    }

    /// 名为 `boom` 的切片会让后端 panic
    struct PanickyManager;

    impl SliceDataManager for PanickyManager {
        fn create_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
            if slice.name.as_deref() == Some("boom") {
                panic!("backend exploded");
            }
            Ok(slice.clone())
        }
        fn update_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
            Ok(slice.clone())
        }
        fn delete_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
            Ok(slice.clone())
        }
        fn read_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
            Ok(slice.clone())
        }
        fn list_slices(&self) -> Result<Option<Vec<SliceRecord>>, ClientError> {
            Ok(Some(Vec::new()))
        }
    }

    #[test]
    fn test_panicking_task_is_recorded_as_failure() {
        let manager: Arc<dyn SliceDataManager> = Arc::new(PanickyManager);
        let names = vec!["ok".to_string(), "boom".to_string()];

        let results = BatchExecutor::new(2)
            .run_batch(create_tasks(&manager, &names), &CancelToken::new())
            .unwrap();

        assert_eq!(results.len(), 2);
        let ok = results.iter().find(|r| r.name == "ok").unwrap();
        assert!(ok.is_success());
        let boom = results.iter().find(|r| r.name == "boom").unwrap();
        assert_eq!(
            boom.outcome,
            Err(TaskError::Panicked("backend exploded".to_string()))
        );
    }

    #[test]
    fn test_pool_bounds_parallelism() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut mock = MockSliceDataManager::new();
        let (f, p) = (Arc::clone(&in_flight), Arc::clone(&peak));
        mock.expect_create_slice().returning(move |s| {
            let now = f.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(10));
            f.fetch_sub(1, Ordering::SeqCst);
            Ok(s.clone())
        });
        let manager: Arc<dyn SliceDataManager> = Arc::new(mock);
        let names: Vec<String> = (0..24).map(|i| format!("s{}", i)).collect();

        let results = BatchExecutor::new(3)
            .run_batch(create_tasks(&manager, &names), &CancelToken::new())
            .unwrap();

        assert_eq!(results.len(), 24);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_interrupt_during_teardown_stops_waiting() {
        let executor = BatchExecutor::new(1).with_shutdown_timeout(Duration::from_secs(30));
        // 保留发送端，模拟一直未结束的 worker
        let (_tx, rx) = channel::unbounded::<Completion>();
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            trigger.cancel();
        });

        let started = Instant::now();
        assert!(!executor.await_termination(&rx, &cancel));
        assert!(started.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();
    }

    #[test]
    fn test_teardown_gives_up_after_timeout() {
        let executor = BatchExecutor::new(1).with_shutdown_timeout(Duration::from_millis(120));
        let (_tx, rx) = channel::unbounded::<Completion>();

        let started = Instant::now();
        assert!(executor.await_termination(&rx, &CancelToken::new()));
        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[test]
    fn test_cancelled_batch_is_interrupted() {
        let manager: Arc<dyn SliceDataManager> =
            Arc::new(InMemorySliceDataManager::new().with_latency(Duration::from_millis(200)));
        let names: Vec<String> = (0..20).map(|i| format!("slice{}", i)).collect();

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            trigger.cancel();
        });

        let err = BatchExecutor::new(2)
            .with_shutdown_timeout(Duration::from_secs(5))
            .run_batch(create_tasks(&manager, &names), &cancel)
            .unwrap_err();
        canceller.join().unwrap();

        match err {
            BatchError::Interrupted { completed, total } => {
                assert_eq!(total, 20);
                assert!(completed < 20);
            }
            other => panic!("unexpected error: {other}"),
        }
        // 未开始的任务不会再调用后端
        assert!(manager.list_slices().unwrap().unwrap().len() < 20);
    }
}
