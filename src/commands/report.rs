//! # 批量结果报告
//!
//! 打印成功/失败汇总表，并可把每个任务的结果写成 CSV。
//!
//! ## 依赖关系
//! - 被 `commands/run.rs` 调用
//! - 使用 `tabled` 打印表格，`csv` 写出报告

use crate::batch::{BatchReport, BatchResult};
use crate::error::{Result, SliceBatchError, TaskError};
use crate::utils::output;

use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tabled::{Table, Tabled};

/// 最多列出的失败条目
const MAX_LISTED_FAILURES: usize = 10;

/// 汇总行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Success")]
    success: usize,
    #[tabled(rename = "Failed")]
    failed: usize,
}

/// 失败明细行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "Slice")]
    slice: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// CSV 报告行
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    slice: &'a str,
    operation: String,
    status: &'static str,
    slice_id: &'a str,
    cause: &'a str,
    detail: String,
}

impl<'a> From<&'a BatchResult> for ReportRow<'a> {
    fn from(result: &'a BatchResult) -> Self {
        let (status, slice_id, cause, detail) = match &result.outcome {
            Ok(slice) => ("success", slice.id.as_deref().unwrap_or(""), "", String::new()),
            Err(TaskError::Remote { cause, detail }) => ("failed", "", cause.as_str(), detail.clone()),
            Err(e) => ("failed", "", "", e.to_string()),
        };
        ReportRow {
            slice: &result.name,
            operation: result.operation.to_string(),
            status,
            slice_id,
            cause,
            detail,
        }
    }
}

/// 打印汇总表与部分失败明细
pub fn print_summary(operation: &str, report: &BatchReport) {
    output::print_separator();

    let summary = [SummaryRow {
        operation: operation.to_string(),
        total: report.total(),
        success: report.success,
        failed: report.failed,
    }];
    println!("{}", Table::new(summary));

    if report.failed > 0 {
        output::print_warning("Failed slices:");
        let rows: Vec<FailureRow> = report
            .failures()
            .take(MAX_LISTED_FAILURES)
            .map(|r| FailureRow {
                slice: r.name.clone(),
                error: r
                    .outcome
                    .as_ref()
                    .err()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            })
            .collect();
        println!("{}", Table::new(rows));
        if report.failed > MAX_LISTED_FAILURES {
            output::print_warning(&format!(
                "  ... and {} more",
                report.failed - MAX_LISTED_FAILURES
            ));
        }
    } else {
        output::print_done(&format!("{} slices processed", report.total()));
    }
}

/// 每个任务一行写出 CSV
pub fn write_csv(path: &Path, report: &BatchReport) -> Result<()> {
    let file = File::create(path).map_err(|e| SliceBatchError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut writer = csv::Writer::from_writer(file);
    for result in &report.results {
        writer.serialize(ReportRow::from(result))?;
    }
    writer.flush().map_err(|e| SliceBatchError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    output::print_success(&format!("{} rows written", report.results.len()));
    Ok(())
}
