use crate::app::state::AppState;
use crate::domain::daily_log::DailyLogInput;

use super::common::{map_api_error, parse_date, to_json};

// ==========================================
// 施工日志相关命令
// ==========================================

/// 提交施工日志（同日合并）
pub fn submit_daily_log(state: &AppState, input: DailyLogInput) -> Result<String, String> {
    let result = state.daily_log_api.submit(input).map_err(map_api_error)?;
    to_json(&result)
}

pub fn get_daily_log(state: &AppState, project_id: &str, log_date: &str) -> Result<String, String> {
    let log_date = parse_date(log_date)?;
    let result = state
        .daily_log_api
        .get(project_id, log_date)
        .map_err(map_api_error)?;

    to_json(&result)
}

pub fn list_daily_logs(state: &AppState, project_id: &str) -> Result<String, String> {
    let result = state.daily_log_api.list(project_id).map_err(map_api_error)?;
    to_json(&result)
}
