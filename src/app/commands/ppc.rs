use crate::app::state::AppState;

use super::common::{map_api_error, parse_date, parse_optional_date, to_json};

// ==========================================
// PPC 相关命令
// ==========================================

/// 计算并保存指定周 PPC
pub fn calculate_ppc(state: &AppState, project_id: &str, week_start: &str) -> Result<String, String> {
    let week_start = parse_date(week_start)?;
    let result = state
        .ppc_api
        .calculate_ppc(project_id, week_start)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_ppc_history(state: &AppState, project_id: &str) -> Result<String, String> {
    let result = state.ppc_api.history(project_id).map_err(map_api_error)?;
    to_json(&result)
}

/// 指定周 PPC（未计算时返回 null）
pub fn get_ppc_week(state: &AppState, project_id: &str, week_start: &str) -> Result<String, String> {
    let week_start = parse_date(week_start)?;
    let result = state
        .ppc_api
        .get_week(project_id, week_start)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_current_ppc(state: &AppState, project_id: &str) -> Result<String, String> {
    let result = state.ppc_api.current(project_id).map_err(map_api_error)?;
    to_json(&result)
}

pub fn get_ppc_by_trade(
    state: &AppState,
    project_id: &str,
    week_start: Option<&str>,
) -> Result<String, String> {
    let week_start = parse_optional_date(week_start)?;
    let result = state
        .ppc_api
        .by_trade(project_id, week_start)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_variance_history(state: &AppState, project_id: &str) -> Result<String, String> {
    let result = state
        .ppc_api
        .variance_history(project_id)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_variance_reasons(
    state: &AppState,
    project_id: &str,
    week_start: Option<&str>,
) -> Result<String, String> {
    let week_start = parse_optional_date(week_start)?;
    let result = state
        .ppc_api
        .variance_reasons(project_id, week_start)
        .map_err(map_api_error)?;

    to_json(&result)
}
