//! # 统一错误处理模块
//!
//! 定义 slice-batch 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分层
//! - `ClientError`: 外部切片 API 返回的错误（客户端错误 / 远端 NBI 错误）
//! - `TaskError`: 单个批量任务的失败，只记录，不影响同批其他任务
//! - `BatchError`: 执行器级别错误（线程池创建失败、被中断）
//! - `SliceBatchError`: 工作流与命令层的统一错误
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 切片 API 调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// 客户端侧的一般错误（连接失败、序列化失败等）
    #[error("Client error: {0}")]
    Client(String),

    /// 远端返回的结构化错误
    #[error("Remote error: cause={cause}, detail={detail}")]
    Nbi { cause: String, detail: String },
}

impl ClientError {
    pub fn nbi(cause: impl Into<String>, detail: impl Into<String>) -> Self {
        ClientError::Nbi {
            cause: cause.into(),
            detail: detail.into(),
        }
    }
}

/// 单个任务的失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("remote failure (cause: {cause}, detail: {detail})")]
    Remote { cause: String, detail: String },

    #[error("client failure: {0}")]
    Client(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    /// worker 在返回结果之前消失（线程池已被拆除）
    #[error("task abandoned before completion")]
    Abandoned,
}

impl From<ClientError> for TaskError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Client(msg) => TaskError::Client(msg),
            ClientError::Nbi { cause, detail } => TaskError::Remote { cause, detail },
        }
    }
}

/// 批量执行器错误
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("Batch interrupted after {completed} of {total} results")]
    Interrupted { completed: usize, total: usize },
}

/// slice-batch 统一错误类型
#[derive(Error, Debug)]
pub enum SliceBatchError {
    // ─────────────────────────────────────────────────────────────
    // 工作流错误
    // ─────────────────────────────────────────────────────────────
    #[error("Precondition failed: {message}")]
    Precondition {
        message: String,
        #[source]
        source: Option<ClientError>,
    },

    #[error(transparent)]
    Batch(#[from] BatchError),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid number for <{field}>: '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("<{field}> must be non-negative: '{value}'")]
    NegativeNumber { field: String, value: String },

    // ─────────────────────────────────────────────────────────────
    // 配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 与报告输出
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl SliceBatchError {
    pub fn precondition(message: impl Into<String>, source: Option<ClientError>) -> Self {
        SliceBatchError::Precondition {
            message: message.into(),
            source,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SliceBatchError>;
