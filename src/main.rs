//! # slice-batch - 切片批量操作工具
//!
//! 对切片管理 API 并发地批量创建、更新、删除网络切片，用于负载生成与冒烟测试。
//!
//! ## 请求
//! - `create` - 按数量生成切片与流并并行创建
//! - `update` - 读取所有已登记切片，修改全部流的带宽/延迟
//! - `delete` - 删除所有已登记切片
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数与请求解析)
//!   ├── commands/   (驱动与结果报告)
//!   │     ├── batch/   (请求生成、任务、执行器、工作流)
//!   │     ├── client/  (切片管理 API 与内存后端)
//!   │     ├── config/  (属性文件配置)
//!   │     └── models/  (切片与流数据模型)
//!   ├── utils/      (输出、进度条、日志、中断处理)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::init(&cli.log_level, cli.log_json) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }

    let cancel = batch::CancelToken::new();
    if let Err(e) = utils::interrupt::install(cancel.clone()) {
        tracing::warn!(error = %e, "batches can not be interrupted with Ctrl-C");
    }

    if let Err(e) = commands::run(cli, cancel) {
        tracing::error!(error = %e, "batch run failed");
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
