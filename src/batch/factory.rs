//! # 请求生成器
//!
//! 生成或变换要提交的切片/流 DTO，无副作用、无 I/O。
//!
//! ## 命名规则
//! - 切片名 `slice%08d`，按切片序号
//! - 流名 `flow%08d`，整个批次共享同一个计数器
//! - 端口号从 100 开始，每条流加一，源端与目的端使用同一个值
//!
//! 延迟未指定时在大延迟 (9999) 与小延迟 (10) 之间等概率随机选择，
//! 随机源由调用方注入。
//!
//! ## 依赖关系
//! - 被 `batch/workflows.rs` 使用
//! - 使用 `models/slice.rs`, `config/client.rs`
//! - 使用 `rand` 选择默认延迟

use crate::config::ClientConfig;
use crate::models::{FlowOperation, FlowRecord, SliceRecord};

use rand::Rng;

pub const CE_PORT_NO_OFFSET: u32 = 100;
/// 1 Mbps
pub const REQ_BAND_WIDTH: u32 = 1;
pub const LARGE_REQ_DELAY: u32 = 9999;
pub const SMALL_REQ_DELAY: u32 = 10;
pub const PROTECTION_LEVEL: &str = "0";

const SRC_CE_NODE_NAME: &str = "tokyo";
const DST_CE_NODE_NAME: &str = "osaka";
const CE_NODE_NAME_SUFFIX: &str = "123";

/// 流名与端口号的单调计数器，只在构建阶段使用
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    flow_index: usize,
    port_no: u32,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        SequenceCounter {
            flow_index: 0,
            port_no: CE_PORT_NO_OFFSET,
        }
    }
}

impl SequenceCounter {
    /// 取出下一组 (流名, 端口号) 并推进计数器
    fn next(&mut self) -> (String, String) {
        let name = format!("flow{:08}", self.flow_index);
        let port = format!("{:08}", self.port_no);
        self.flow_index += 1;
        self.port_no += 1;
        (name, port)
    }
}

/// 请求生成器
#[derive(Debug, Clone)]
pub struct RequestFactory {
    node_suffix: &'static str,
}

impl RequestFactory {
    /// `other_client` 为 true 时节点名不追加后缀
    pub fn new(other_client: bool) -> Self {
        let node_suffix = if other_client { "" } else { CE_NODE_NAME_SUFFIX };
        RequestFactory { node_suffix }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.is_other_client())
    }

    /// 生成创建批次
    pub fn build_create_batch<R: Rng>(
        &self,
        rng: &mut R,
        slice_count: usize,
        flows_per_slice: usize,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    ) -> Vec<SliceRecord> {
        let mut counter = SequenceCounter::default();
        let mut slices = Vec::with_capacity(slice_count);

        for slice_idx in 0..slice_count {
            let mut slice = SliceRecord::named(format!("slice{:08}", slice_idx));
            for _ in 0..flows_per_slice {
                let flow = self.request_flow(&mut counter, rng, bandwidth, latency);
                slice.flows.push(flow);
            }
            slices.push(slice);
        }

        slices
    }

    /// 把已登记的切片变换为修改请求，每个切片的计数器从 0 重新开始
    pub fn build_update_batch<R: Rng>(
        &self,
        rng: &mut R,
        existing: &SliceRecord,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    ) -> SliceRecord {
        let mut counter = SequenceCounter::default();

        let mut flows = Vec::with_capacity(existing.flows.len());

        for flow in &existing.flows {
            let mut update = self.request_flow(&mut counter, rng, bandwidth, latency);
            update.id = flow.id.clone();
            update.operation = Some(FlowOperation::Modify);
            flows.push(update);
        }

        SliceRecord {
            id: existing.id.clone(),
            name: None,
            flows,
        }
    }

    /// 删除请求只携带标识
    pub fn build_delete_request(&self, existing: &SliceRecord) -> SliceRecord {
        SliceRecord {
            id: existing.id.clone(),
            name: existing.name.clone(),
            flows: Vec::new(),
        }
    }

    fn request_flow<R: Rng>(
        &self,
        counter: &mut SequenceCounter,
        rng: &mut R,
        bandwidth: Option<u32>,
        latency: Option<u32>,
    ) -> FlowRecord {
        let (name, port) = counter.next();
        let req_delay = latency.unwrap_or_else(|| {
            if rng.gen_bool(0.5) {
                LARGE_REQ_DELAY
            } else {
                SMALL_REQ_DELAY
            }
        });

        FlowRecord {
            id: None,
            name,
            src_ce_node_name: format!("{}{}", SRC_CE_NODE_NAME, self.node_suffix),
            src_ce_port_no: port.clone(),
            dst_ce_node_name: format!("{}{}", DST_CE_NODE_NAME, self.node_suffix),
            dst_ce_port_no: port,
            req_band_width: bandwidth.unwrap_or(REQ_BAND_WIDTH),
            req_delay,
            protection_level: PROTECTION_LEVEL.to_string(),
            operation: None,
        }
    }
}
