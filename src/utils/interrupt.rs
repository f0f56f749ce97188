//! # 中断处理
//!
//! 把 Ctrl-C (SIGINT) 转换为批量执行器的协作式中断。
//!
//! 第一次 Ctrl-C 触发 `CancelToken`，正在执行的批次拆除线程池后返回中断错误；
//! 中断已触发后再次 Ctrl-C 直接退出进程。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `ctrlc` 安装信号处理函数

use crate::batch::CancelToken;
use crate::error::{Result, SliceBatchError};

/// 再次中断时的退出码 (128 + SIGINT)
const EXIT_CODE_INTERRUPTED: i32 = 130;

/// 安装进程级的 Ctrl-C 处理函数，只能调用一次
pub fn install(cancel: CancelToken) -> Result<()> {
    ctrlc::set_handler(move || on_interrupt(&cancel))
        .map_err(|e| SliceBatchError::Other(format!("failed to install Ctrl-C handler: {e}")))
}

fn on_interrupt(cancel: &CancelToken) {
    if cancel.is_cancelled() {
        std::process::exit(EXIT_CODE_INTERRUPTED);
    }
    tracing::warn!("interrupt received, cancelling the running batch");
    cancel.cancel();
}
