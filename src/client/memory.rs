//! # 内存切片后端
//!
//! 在进程内模拟切片管理服务（dummy invoker），用于离线运行批量命令和测试。
//!
//! ## 功能
//! - 创建时分配切片 ID (`S%08d`) 与流 ID (`F%08d`)
//! - 重名切片返回 `BadRequest`，未知 ID 返回 `NotFound`
//! - 更新请求按流的 `add`/`mod`/`del` 标记逐条应用，失败时整体不生效
//! - 请求经 JSON 编解码后再处理，编解码失败为 `ClientError::Client`
//! - 可选的人工延迟，用于观察并发行为
//!
//! ## 依赖关系
//! - 实现 `client::SliceDataManager`
//! - 使用 `parking_lot` 保护内部状态
//! - 使用 `serde_json` 模拟请求的线上编码

use super::SliceDataManager;
use crate::error::ClientError;
use crate::models::{FlowOperation, FlowRecord, SliceRecord};

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;

const CAUSE_BAD_REQUEST: &str = "BadRequest";
const CAUSE_NOT_FOUND: &str = "NotFound";

#[derive(Debug, Default)]
struct Inventory {
    slices: BTreeMap<String, SliceRecord>,
    next_slice_id: u64,
    next_flow_id: u64,
}

impl Inventory {
    fn allocate_flow_id(&mut self) -> String {
        self.next_flow_id += 1;
        format!("F{:08}", self.next_flow_id)
    }
}

/// 内存切片后端
#[derive(Debug, Default)]
pub struct InMemorySliceDataManager {
    inventory: Mutex<Inventory>,
    latency: Duration,
}

impl InMemorySliceDataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用前人工等待的时长
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
    }

    fn require_id(slice: &SliceRecord) -> Result<&str, ClientError> {
        slice
            .id
            .as_deref()
            .ok_or_else(|| ClientError::nbi(CAUSE_BAD_REQUEST, "slice id is required"))
    }

    fn not_found(id: &str) -> ClientError {
        ClientError::nbi(CAUSE_NOT_FOUND, format!("slice '{}' does not exist", id))
    }
}

#[cfg(test)]
impl InMemorySliceDataManager {
    /// 当前保存的切片数量
    pub fn len(&self) -> usize {
        self.inventory.lock().slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 请求先经过 JSON 编解码，后端只处理可以在线上传输的字段
fn over_wire(slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
    let body = serde_json::to_vec(slice)
        .map_err(|e| ClientError::Client(format!("failed to encode request: {e}")))?;
    serde_json::from_slice(&body)
        .map_err(|e| ClientError::Client(format!("failed to decode request: {e}")))
}

/// 把请求流的字段合并进已存在的流（保留 ID）
fn merge_flow(target: &mut FlowRecord, request: &FlowRecord) {
    if !request.name.is_empty() {
        target.name = request.name.clone();
    }
    target.src_ce_node_name = request.src_ce_node_name.clone();
    target.src_ce_port_no = request.src_ce_port_no.clone();
    target.dst_ce_node_name = request.dst_ce_node_name.clone();
    target.dst_ce_port_no = request.dst_ce_port_no.clone();
    target.req_band_width = request.req_band_width;
    target.req_delay = request.req_delay;
    target.protection_level = request.protection_level.clone();
}

impl SliceDataManager for InMemorySliceDataManager {
    fn create_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
        self.simulate_latency();
        let slice = &over_wire(slice)?;

        let name = slice
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ClientError::nbi(CAUSE_BAD_REQUEST, "slice name is required"))?;

        let mut inv = self.inventory.lock();
        if inv
            .slices
            .values()
            .any(|s| s.name.as_deref() == Some(name))
        {
            return Err(ClientError::nbi(
                CAUSE_BAD_REQUEST,
                format!("slice name '{}' already exists", name),
            ));
        }

        inv.next_slice_id += 1;
        let id = format!("S{:08}", inv.next_slice_id);

        let mut flows = Vec::with_capacity(slice.flows.len());
        for flow in &slice.flows {
            let mut stored = flow.clone();
            stored.id = Some(inv.allocate_flow_id());
            stored.operation = None;
            flows.push(stored);
        }

        let created = SliceRecord {
            id: Some(id.clone()),
            name: Some(name.to_string()),
            flows,
        };
        inv.slices.insert(id, created.clone());
        Ok(created)
    }

    fn update_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
        self.simulate_latency();
        let slice = &over_wire(slice)?;

        let id = Self::require_id(slice)?;
        let mut inv = self.inventory.lock();
        let mut updated = inv
            .slices
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(name) = slice.name.as_deref().filter(|n| !n.is_empty()) {
            updated.name = Some(name.to_string());
        }

        for flow in &slice.flows {
            match flow.operation {
                Some(FlowOperation::Add) => {
                    let mut added = flow.clone();
                    added.id = Some(inv.allocate_flow_id());
                    added.operation = None;
                    updated.flows.push(added);
                }
                Some(FlowOperation::Modify) | None => {
                    let flow_id = flow.id.as_deref().ok_or_else(|| {
                        ClientError::nbi(CAUSE_BAD_REQUEST, "flow id is required for mod")
                    })?;
                    let target = updated
                        .flows
                        .iter_mut()
                        .find(|f| f.id.as_deref() == Some(flow_id))
                        .ok_or_else(|| {
                            ClientError::nbi(
                                CAUSE_NOT_FOUND,
                                format!("flow '{}' does not exist in slice '{}'", flow_id, id),
                            )
                        })?;
                    merge_flow(target, flow);
                }
                Some(FlowOperation::Delete) => {
                    let flow_id = flow.id.as_deref().ok_or_else(|| {
                        ClientError::nbi(CAUSE_BAD_REQUEST, "flow id is required for del")
                    })?;
                    let before = updated.flows.len();
                    updated.flows.retain(|f| f.id.as_deref() != Some(flow_id));
                    if updated.flows.len() == before {
                        return Err(ClientError::nbi(
                            CAUSE_NOT_FOUND,
                            format!("flow '{}' does not exist in slice '{}'", flow_id, id),
                        ));
                    }
                }
            }
        }

        inv.slices.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    fn delete_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
        self.simulate_latency();
        let slice = &over_wire(slice)?;

        let id = Self::require_id(slice)?;
        let removed = self
            .inventory
            .lock()
            .slices
            .remove(id)
            .ok_or_else(|| Self::not_found(id))?;

        Ok(SliceRecord {
            id: removed.id,
            name: removed.name,
            flows: Vec::new(),
        })
    }

    fn read_slice(&self, slice: &SliceRecord) -> Result<SliceRecord, ClientError> {
        self.simulate_latency();
        let slice = &over_wire(slice)?;

        let id = Self::require_id(slice)?;
        self.inventory
            .lock()
            .slices
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    fn list_slices(&self) -> Result<Option<Vec<SliceRecord>>, ClientError> {
        self.simulate_latency();

        let summaries = self
            .inventory
            .lock()
            .slices
            .values()
            .map(|s| SliceRecord {
                id: s.id.clone(),
                name: s.name.clone(),
                flows: Vec::new(),
            })
            .collect();
        Ok(Some(summaries))
    }
}
