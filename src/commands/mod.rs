//! # 命令执行模块
//!
//! 批量驱动的执行逻辑与结果报告。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config/`, `client/`, `batch/`, `utils/`
//! - 子模块: run, report

pub mod report;
pub mod run;

use crate::batch::CancelToken;
use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli, cancel: CancelToken) -> Result<()> {
    run::execute(cli, cancel)
}
