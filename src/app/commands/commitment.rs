use crate::app::state::AppState;
use crate::domain::commitment::{CommitmentPatch, NewCommitment};

use super::common::{map_api_error, parse_optional_date, to_json};

// ==========================================
// 周承诺台账相关命令
// ==========================================

pub fn create_commitment(state: &AppState, input: NewCommitment) -> Result<String, String> {
    let result = state.commitment_api.create(input).map_err(map_api_error)?;
    to_json(&result)
}

/// 批量创建（整批校验，任一失败不写入）
pub fn bulk_create_commitments(state: &AppState, items: Vec<NewCommitment>) -> Result<String, String> {
    let result = state
        .commitment_api
        .bulk_create(items)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn patch_commitment(state: &AppState, id: &str, patch: CommitmentPatch) -> Result<String, String> {
    let result = state
        .commitment_api
        .patch(id, patch)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_commitment(state: &AppState, id: &str) -> Result<String, String> {
    let result = state.commitment_api.get(id).map_err(map_api_error)?;
    to_json(&result)
}

/// 查询承诺（指定 week_start 时只返回该周）
pub fn list_commitments(
    state: &AppState,
    project_id: &str,
    week_start: Option<&str>,
) -> Result<String, String> {
    let result = match parse_optional_date(week_start)? {
        Some(week) => state.commitment_api.list_by_week(project_id, week),
        None => state.commitment_api.list_by_project(project_id),
    }
    .map_err(map_api_error)?;

    to_json(&result)
}
