use crate::api::{EarliestScheduleRequest, FeasibilityRequest, SequenceRequest};
use crate::app::state::AppState;
use crate::domain::relationship::ActivityRelationshipTemplate;
use crate::domain::types::{Discipline, ProjectType};

use super::common::{map_api_error, to_json};

// ==========================================
// 工序编排相关命令
// ==========================================

/// 工种集合适用的关系模板
pub fn get_relationships_for_trades(
    state: &AppState,
    trade_codes: &[String],
    project_type: ProjectType,
) -> Result<String, String> {
    let result = state
        .planning_api
        .relationships_for_trades(trade_codes, project_type)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn get_sub_activities(state: &AppState, trade_code: &str) -> Result<String, String> {
    let result = state
        .planning_api
        .sub_activities(trade_code)
        .map_err(map_api_error)?;

    to_json(&result)
}

/// 关系目录概况 (扩展目录 / 工种代码 / 关系条数)
pub fn get_catalog_overview(state: &AppState, project_type: ProjectType) -> Result<String, String> {
    to_json(&state.planning_api.catalog_overview(project_type))
}

pub fn get_discipline_templates(state: &AppState, discipline: Discipline) -> Result<String, String> {
    to_json(&state.planning_api.discipline_templates(discipline))
}

/// 环诊断（不报错，返回参与成环的节点）
pub fn detect_cycles(state: &AppState, relationships: &[ActivityRelationshipTemplate]) -> Result<String, String> {
    to_json(&state.planning_api.cycle_diagnostics(relationships))
}

pub fn sequence_trades(state: &AppState, request: SequenceRequest) -> Result<String, String> {
    let result = state
        .planning_api
        .sequence_trades(request)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn check_feasibility(state: &AppState, request: FeasibilityRequest) -> Result<String, String> {
    let result = state
        .planning_api
        .check_feasibility(request)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn earliest_schedule(state: &AppState, request: EarliestScheduleRequest) -> Result<String, String> {
    let result = state
        .planning_api
        .earliest_schedule(request)
        .map_err(map_api_error)?;

    to_json(&result)
}
