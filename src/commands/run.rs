//! # 批量驱动
//!
//! 解析请求、加载配置、连接后端并执行对应的批量工作流。
//!
//! ## 行为
//! - 请求格式不符：打印用法，不执行任何操作
//! - 执行前后记录开始/结束时间与耗时
//! - `cancel` 被触发（Ctrl-C）时批次中断并返回错误
//! - 结束后打印成功/失败汇总，可选写出 CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/` 定义的参数与请求
//! - 使用 `batch/workflows.rs`, `client/`, `config/`
//! - 使用 `commands/report.rs`, `utils/output.rs`

use super::report;
use crate::batch::{BatchExecutor, BatchReport, BatchWorkflows, CancelToken, RequestFactory};
use crate::cli::{BatchRequest, Cli, USAGE};
use crate::client;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::utils::output;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// 执行批量命令
pub fn execute(cli: Cli, cancel: CancelToken) -> Result<()> {
    let request = match BatchRequest::parse(&cli.request)? {
        Some(request) => request,
        None => {
            print_usage();
            return Ok(());
        }
    };

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(jobs) = cli.jobs {
        config.batch.pool_size = jobs;
    }

    let manager = client::connect(&config)?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let executor = BatchExecutor::from_config(&config).with_progress(cli.progress);
    tracing::debug!(
        workers = executor.pool_size(),
        src_component = %config.server.src_component_name,
        server = %config.server.base_uri,
        connection_timeout_sec = config.server.connection_timeout_sec,
        read_timeout_sec = config.server.read_timeout_sec,
        "batch driver configured"
    );

    let mut workflows =
        BatchWorkflows::new(manager, RequestFactory::from_config(&config), executor, rng)
            .with_cancel_token(cancel);

    output::print_header(&format!("Slice Batch: {}", label(&request)));

    tracing::info!("Start processing");
    let started = Instant::now();
    let result = dispatch(&mut workflows, request);
    tracing::info!("End processing");
    tracing::info!(
        "Processing time: {} [msec]",
        started.elapsed().as_millis()
    );

    let batch = result?;
    report::print_summary(label(&request), &batch);

    if let Some(path) = &cli.report {
        report::write_csv(path, &batch)?;
        output::print_info(&format!("Report written to '{}'", path.display()));
    }

    Ok(())
}

fn dispatch<R: Rng>(workflows: &mut BatchWorkflows<R>, request: BatchRequest) -> Result<BatchReport> {
    match request {
        BatchRequest::Create {
            slice_count,
            flows_per_slice,
            bandwidth,
            latency,
        } => workflows.bulk_create(slice_count, flows_per_slice, bandwidth, latency),
        BatchRequest::Update { bandwidth, latency } => {
            workflows.bulk_update_all(bandwidth, latency)
        }
        BatchRequest::Delete => workflows.bulk_delete_all(),
    }
}

fn label(request: &BatchRequest) -> &'static str {
    match request {
        BatchRequest::Create { .. } => "create",
        BatchRequest::Update { .. } => "update",
        BatchRequest::Delete => "delete",
    }
}

fn print_usage() {
    for line in USAGE {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemorySliceDataManager;
    use crate::error::{BatchError, SliceBatchError};
    use clap::Parser;
    use std::io::Write;
    use std::sync::Arc;

    #[test]
    fn test_malformed_request_is_not_an_error() {
        let cli = Cli::try_parse_from(["slice-batch", "create", "1"]).unwrap();
        assert!(execute(cli, CancelToken::new()).is_ok());
    }

    #[test]
    fn test_non_numeric_request_is_an_error() {
        let cli = Cli::try_parse_from(["slice-batch", "update", "fast", "1"]).unwrap();
        assert!(execute(cli, CancelToken::new()).is_err());
    }

    #[test]
    fn test_cancelled_run_is_an_error() {
        let cli = Cli::try_parse_from(["slice-batch", "create", "3", "2"]).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = execute(cli, cancel).unwrap_err();
        assert!(matches!(
            err,
            SliceBatchError::Batch(BatchError::Interrupted { completed: 0, total: 3 })
        ));
    }

    #[test]
    fn test_unparsable_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch: [not, a, mapping").unwrap();
        let cli = Cli::try_parse_from([
            "slice-batch",
            "--config",
            file.path().to_str().unwrap(),
            "delete",
        ])
        .unwrap();

        assert!(matches!(
            execute(cli, CancelToken::new()),
            Err(SliceBatchError::Config(_))
        ));
    }

    #[test]
    fn test_create_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let cli = Cli::try_parse_from([
            "slice-batch",
            "--seed",
            "9",
            "--report",
            path.to_str().unwrap(),
            "create",
            "3",
            "2",
        ])
        .unwrap();

        execute(cli, CancelToken::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("slice00000002"));
    }

    #[test]
    fn test_dispatch_runs_matching_workflow() {
        let backend = Arc::new(InMemorySliceDataManager::new());
        let mut workflows = BatchWorkflows::new(
            backend.clone(),
            RequestFactory::new(true),
            BatchExecutor::new(2),
            StdRng::seed_from_u64(0),
        );

        let create = BatchRequest::Create {
            slice_count: 2,
            flows_per_slice: 1,
            bandwidth: None,
            latency: None,
        };
        assert_eq!(dispatch(&mut workflows, create).unwrap().success, 2);

        let update = BatchRequest::Update {
            bandwidth: Some(7),
            latency: None,
        };
        assert_eq!(dispatch(&mut workflows, update).unwrap().success, 2);

        assert_eq!(
            dispatch(&mut workflows, BatchRequest::Delete)
                .unwrap()
                .success,
            2
        );
        assert!(backend.is_empty());
    }
}
