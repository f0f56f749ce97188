//! # 切片数据模型
//!
//! 与切片管理 API 交换的 DTO：切片 (`SliceRecord`) 和流 (`FlowRecord`)。
//!
//! ## 依赖关系
//! - 被 `batch/`, `client/` 使用
//! - 使用 `serde` 做日志输出与报告序列化

use serde::{Deserialize, Serialize};

/// 更新请求中单条流的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowOperation {
    Add,
    #[serde(rename = "mod")]
    Modify,
    #[serde(rename = "del")]
    Delete,
}

impl std::fmt::Display for FlowOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowOperation::Add => write!(f, "add"),
            FlowOperation::Modify => write!(f, "mod"),
            FlowOperation::Delete => write!(f, "del"),
        }
    }
}

/// 流：两个 CE 节点之间的一条连接请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// 流 ID（引用已存在的流时设置）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 流名称
    pub name: String,

    /// 源 CE 节点名
    pub src_ce_node_name: String,

    /// 源 CE 端口号
    pub src_ce_port_no: String,

    /// 目的 CE 节点名
    pub dst_ce_node_name: String,

    /// 目的 CE 端口号
    pub dst_ce_port_no: String,

    /// 请求带宽 (Mbps)
    pub req_band_width: u32,

    /// 请求延迟
    pub req_delay: u32,

    /// 保护级别
    pub protection_level: String,

    /// 仅用于更新请求
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub operation: Option<FlowOperation>,
}

/// 切片：包含有序流集合的顶层资源
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRecord {
    /// 切片 ID（创建之前为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// 切片名称
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// 流列表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<FlowRecord>,
}

impl SliceRecord {
    pub fn named(name: impl Into<String>) -> Self {
        SliceRecord {
            id: None,
            name: Some(name.into()),
            flows: Vec::new(),
        }
    }

    /// 日志用的显示名：优先名称，其次 ID
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }
}

#[cfg(test)]
impl SliceRecord {
    pub fn with_id(id: impl Into<String>) -> Self {
        SliceRecord {
            id: Some(id.into()),
            name: None,
            flows: Vec::new(),
        }
    }
}
