//! # 批量请求解析
//!
//! 把位置参数解析为 `BatchRequest`。
//!
//! ## 规则
//! - 关键字或参数个数不符：返回 `Ok(None)`，调用方打印用法
//! - 数值参数无法解析：返回 `InvalidNumber` 错误
//! - 数值参数为负数：返回 `NegativeNumber` 错误
//!
//! ## 依赖关系
//! - 被 `commands/run.rs` 使用

use crate::error::{Result, SliceBatchError};

use std::str::FromStr;

/// 用法说明
pub const USAGE: [&str; 3] = [
    "create multiple slices : create <SliceNum> <FlowNum> [<BandWidth> <Latency>]",
    "update all slices      : update [<BandWidth> <Latency>]",
    "delete all slices      : delete",
];

/// 批量请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRequest {
    Create {
        slice_count: usize,
        flows_per_slice: usize,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    },
    Update {
        bandwidth: Option<u32>,
        latency: Option<u32>,
    },
    Delete,
}

impl BatchRequest {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Option<Self>> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let request = match args.as_slice() {
            ["create", slices, flows] => BatchRequest::Create {
                slice_count: number("SliceNum", slices)?,
                flows_per_slice: number("FlowNum", flows)?,
                bandwidth: None,
                latency: None,
            },
            ["create", slices, flows, bandwidth, latency] => BatchRequest::Create {
                slice_count: number("SliceNum", slices)?,
                flows_per_slice: number("FlowNum", flows)?,
                bandwidth: Some(number("BandWidth", bandwidth)?),
                latency: Some(number("Latency", latency)?),
            },
            ["update"] => BatchRequest::Update {
                bandwidth: None,
                latency: None,
            },
            ["update", bandwidth, latency] => BatchRequest::Update {
                bandwidth: Some(number("BandWidth", bandwidth)?),
                latency: Some(number("Latency", latency)?),
            },
            ["delete"] => BatchRequest::Delete,
            _ => return Ok(None),
        };

        Ok(Some(request))
    }
}

fn number<T: FromStr>(field: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| match value.parse::<i64>() {
        Ok(n) if n < 0 => SliceBatchError::NegativeNumber {
            field: field.to_string(),
            value: value.to_string(),
        },
        _ => SliceBatchError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        },
    })
}
