use crate::api::GenerateFlowlineRequest;
use crate::app::state::AppState;
use crate::domain::progress::ProgressUpdate;

use super::common::{map_api_error, to_json};

// ==========================================
// 流水线相关命令
// ==========================================

/// 生成并保存流水线
pub fn generate_flowline(state: &AppState, request: GenerateFlowlineRequest) -> Result<String, String> {
    let result = state
        .flowline_api
        .generate(request)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_flowline(state: &AppState, plan_id: &str) -> Result<String, String> {
    let result = state.flowline_api.get(plan_id).map_err(map_api_error)?;
    to_json(&result)
}

/// 删除流水线（幂等，返回是否实际删除）
pub fn delete_flowline(state: &AppState, plan_id: &str) -> Result<String, String> {
    let deleted = state.flowline_api.delete(plan_id).map_err(map_api_error)?;
    to_json(&serde_json::json!({ "plan_id": plan_id, "deleted": deleted }))
}

pub fn get_buffers(state: &AppState, plan_id: &str) -> Result<String, String> {
    let result = state.flowline_api.buffers(plan_id).map_err(map_api_error)?;
    to_json(&result)
}

pub fn get_stacking_conflicts(state: &AppState, plan_id: &str) -> Result<String, String> {
    let result = state.flowline_api.stacking(plan_id).map_err(map_api_error)?;
    to_json(&result)
}

pub fn get_flowline_summary(state: &AppState, plan_id: &str) -> Result<String, String> {
    let result = state.flowline_api.summary(plan_id).map_err(map_api_error)?;
    to_json(&result)
}

/// 上报作业进度
pub fn record_progress(state: &AppState, update: ProgressUpdate) -> Result<String, String> {
    let result = state
        .flowline_api
        .record_progress(update)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn list_progress(state: &AppState, assignment_id: &str) -> Result<String, String> {
    let result = state
        .flowline_api
        .list_progress(assignment_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 叠加进度后的流水线
pub fn get_flowline_with_progress(state: &AppState, plan_id: &str) -> Result<String, String> {
    let result = state
        .flowline_api
        .flowline_with_progress(plan_id)
        .map_err(map_api_error)?;

    to_json(&result)
}
