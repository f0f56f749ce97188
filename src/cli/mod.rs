//! # CLI 模块
//!
//! 使用 `clap` 定义全局选项；批量请求本身以位置参数给出，
//! 由 `cli/request.rs` 解析，格式不符时打印用法而不是报错。
//! 选项可以出现在请求词之前或之后；负数作为请求词保留，由请求解析报错。
//!
//! ## 请求格式
//! - `create <SliceNum> <FlowNum> [<BandWidth> <Latency>]`
//! - `update [<BandWidth> <Latency>]`
//! - `delete`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: request

pub mod request;

pub use request::{BatchRequest, USAGE};

use clap::Parser;
use std::path::PathBuf;

/// slice-batch - 切片批量操作工具
#[derive(Parser, Debug)]
#[command(name = "slice-batch")]
#[command(version)]
#[command(allow_negative_numbers = true)]
#[command(
    about = "Concurrent bulk create/update/delete driver for network slices",
    long_about = None
)]
pub struct Cli {
    /// Properties file overriding the built-in defaults
    #[arg(long, env = "SLICE_BATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Parallel workers per batch, overrides batch.pool.size (0 = number of CPUs)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Write one CSV row per task outcome to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show a progress bar while a batch is running
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Seed for the random latency choice (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = crate::utils::logging::DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    pub log_json: bool,

    /// Batch request: create <SliceNum> <FlowNum> [<BandWidth> <Latency>] | update [<BandWidth> <Latency>] | delete
    #[arg(value_name = "REQUEST")]
    pub request: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_options_and_request() {
        let cli = Cli::try_parse_from([
            "slice-batch",
            "--jobs",
            "8",
            "--seed",
            "3",
            "create",
            "2",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.jobs, Some(8));
        assert_eq!(cli.seed, Some(3));
        assert_eq!(cli.request, vec!["create", "2", "3"]);
        assert!(!cli.progress);
    }

    #[test]
    fn test_options_after_request_words() {
        let cli = Cli::try_parse_from(["slice-batch", "create", "2", "3", "--seed", "4"]).unwrap();
        assert_eq!(cli.seed, Some(4));
        assert_eq!(cli.request, vec!["create", "2", "3"]);

        let cli = Cli::try_parse_from(["slice-batch", "update", "--progress", "50", "-5"]).unwrap();
        assert!(cli.progress);
        assert_eq!(cli.request, vec!["update", "50", "-5"]);
    }

    #[test]
    fn test_request_words_are_not_validated_by_clap() {
        let cli = Cli::try_parse_from(["slice-batch", "frobnicate", "-1"]).unwrap();
        assert_eq!(cli.request, vec!["frobnicate", "-1"]);

        let cli = Cli::try_parse_from(["slice-batch"]).unwrap();
        assert!(cli.request.is_empty());
    }
}
