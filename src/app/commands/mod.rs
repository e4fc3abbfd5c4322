// ==========================================
// 节拍排程内核 - JSON 命令层（按域拆分）
// ==========================================
// 职责: 命令名 + JSON 载荷 → 调用 API → JSON 结果
// 错误: 统一为 {code, message, details} JSON
// ==========================================

mod commitment;
mod common;
mod daily_log;
mod flowline;
mod planning;
mod ppc;

use serde::Deserialize;

use crate::app::state::AppState;
use crate::domain::commitment::{CommitmentPatch, NewCommitment};
use crate::domain::relationship::ActivityRelationshipTemplate;
use crate::domain::types::{Discipline, ProjectType};

pub use commitment::*;
pub use common::ErrorResponse;
pub use daily_log::*;
pub use flowline::*;
pub use planning::*;
pub use ppc::*;

use common::parse_payload;

/// 已注册命令
pub const COMMANDS: &[&str] = &[
    "get_relationships_for_trades",
    "get_sub_activities",
    "get_catalog_overview",
    "get_discipline_templates",
    "detect_cycles",
    "sequence_trades",
    "check_feasibility",
    "earliest_schedule",
    "generate_flowline",
    "get_flowline",
    "delete_flowline",
    "get_buffers",
    "get_stacking_conflicts",
    "get_flowline_summary",
    "record_progress",
    "list_progress",
    "get_flowline_with_progress",
    "create_commitment",
    "bulk_create_commitments",
    "patch_commitment",
    "get_commitment",
    "list_commitments",
    "calculate_ppc",
    "get_ppc_history",
    "get_ppc_week",
    "get_current_ppc",
    "get_ppc_by_trade",
    "get_variance_history",
    "get_variance_reasons",
    "submit_daily_log",
    "get_daily_log",
    "list_daily_logs",
];

// ==========================================
// 载荷参数
// ==========================================
#[derive(Deserialize)]
struct PlanIdArgs {
    plan_id: String,
}

#[derive(Deserialize)]
struct AssignmentArgs {
    assignment_id: String,
}

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct ProjectArgs {
    project_id: String,
}

#[derive(Deserialize)]
struct ProjectWeekArgs {
    project_id: String,
    week_start: String,
}

#[derive(Deserialize)]
struct ProjectOptionalWeekArgs {
    project_id: String,
    #[serde(default)]
    week_start: Option<String>,
}

#[derive(Deserialize)]
struct ProjectDateArgs {
    project_id: String,
    log_date: String,
}

#[derive(Deserialize)]
struct TradeCodesArgs {
    trade_codes: Vec<String>,
    #[serde(default)]
    project_type: ProjectType,
}

#[derive(Deserialize)]
struct ProjectTypeArgs {
    #[serde(default)]
    project_type: ProjectType,
}

#[derive(Deserialize)]
struct DisciplineArgs {
    discipline: Discipline,
}

#[derive(Deserialize)]
struct TradeCodeArgs {
    trade_code: String,
}

#[derive(Deserialize)]
struct RelationshipsArgs {
    relationships: Vec<ActivityRelationshipTemplate>,
}

#[derive(Deserialize)]
struct BulkCreateArgs {
    items: Vec<NewCommitment>,
}

#[derive(Deserialize)]
struct PatchArgs {
    id: String,
    patch: CommitmentPatch,
}

/// 执行命令
///
/// # 参数
/// - `command`: 命令名 (见 [`COMMANDS`])
/// - `payload_json`: JSON 对象载荷, 空串视为 `{}`
///
/// # 返回
/// - Ok(String): 结果 JSON
/// - Err(String): ErrorResponse JSON
pub fn dispatch(state: &AppState, command: &str, payload_json: &str) -> Result<String, String> {
    tracing::debug!(command = command, "执行命令");

    match command {
        // ===== 工序编排 =====
        "get_relationships_for_trades" => {
            let args: TradeCodesArgs = parse_payload(payload_json)?;
            get_relationships_for_trades(state, &args.trade_codes, args.project_type)
        }
        "get_sub_activities" => {
            let args: TradeCodeArgs = parse_payload(payload_json)?;
            get_sub_activities(state, &args.trade_code)
        }
        "get_catalog_overview" => {
            let args: ProjectTypeArgs = parse_payload(payload_json)?;
            get_catalog_overview(state, args.project_type)
        }
        "get_discipline_templates" => {
            let args: DisciplineArgs = parse_payload(payload_json)?;
            get_discipline_templates(state, args.discipline)
        }
        "detect_cycles" => {
            let args: RelationshipsArgs = parse_payload(payload_json)?;
            detect_cycles(state, &args.relationships)
        }
        "sequence_trades" => sequence_trades(state, parse_payload(payload_json)?),
        "check_feasibility" => check_feasibility(state, parse_payload(payload_json)?),
        "earliest_schedule" => earliest_schedule(state, parse_payload(payload_json)?),

        // ===== 流水线 / 进度 =====
        "generate_flowline" => generate_flowline(state, parse_payload(payload_json)?),
        "get_flowline" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            get_flowline(state, &args.plan_id)
        }
        "delete_flowline" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            delete_flowline(state, &args.plan_id)
        }
        "get_buffers" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            get_buffers(state, &args.plan_id)
        }
        "get_stacking_conflicts" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            get_stacking_conflicts(state, &args.plan_id)
        }
        "get_flowline_summary" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            get_flowline_summary(state, &args.plan_id)
        }
        "record_progress" => record_progress(state, parse_payload(payload_json)?),
        "list_progress" => {
            let args: AssignmentArgs = parse_payload(payload_json)?;
            list_progress(state, &args.assignment_id)
        }
        "get_flowline_with_progress" => {
            let args: PlanIdArgs = parse_payload(payload_json)?;
            get_flowline_with_progress(state, &args.plan_id)
        }

        // ===== 周承诺 =====
        "create_commitment" => create_commitment(state, parse_payload(payload_json)?),
        "bulk_create_commitments" => {
            let args: BulkCreateArgs = parse_payload(payload_json)?;
            bulk_create_commitments(state, args.items)
        }
        "patch_commitment" => {
            let args: PatchArgs = parse_payload(payload_json)?;
            patch_commitment(state, &args.id, args.patch)
        }
        "get_commitment" => {
            let args: IdArgs = parse_payload(payload_json)?;
            get_commitment(state, &args.id)
        }
        "list_commitments" => {
            let args: ProjectOptionalWeekArgs = parse_payload(payload_json)?;
            list_commitments(state, &args.project_id, args.week_start.as_deref())
        }

        // ===== PPC =====
        "calculate_ppc" => {
            let args: ProjectWeekArgs = parse_payload(payload_json)?;
            calculate_ppc(state, &args.project_id, &args.week_start)
        }
        "get_ppc_history" => {
            let args: ProjectArgs = parse_payload(payload_json)?;
            get_ppc_history(state, &args.project_id)
        }
        "get_ppc_week" => {
            let args: ProjectWeekArgs = parse_payload(payload_json)?;
            get_ppc_week(state, &args.project_id, &args.week_start)
        }
        "get_current_ppc" => {
            let args: ProjectArgs = parse_payload(payload_json)?;
            get_current_ppc(state, &args.project_id)
        }
        "get_ppc_by_trade" => {
            let args: ProjectOptionalWeekArgs = parse_payload(payload_json)?;
            get_ppc_by_trade(state, &args.project_id, args.week_start.as_deref())
        }
        "get_variance_history" => {
            let args: ProjectArgs = parse_payload(payload_json)?;
            get_variance_history(state, &args.project_id)
        }
        "get_variance_reasons" => {
            let args: ProjectOptionalWeekArgs = parse_payload(payload_json)?;
            get_variance_reasons(state, &args.project_id, args.week_start.as_deref())
        }

        // ===== 施工日志 =====
        "submit_daily_log" => submit_daily_log(state, parse_payload(payload_json)?),
        "get_daily_log" => {
            let args: ProjectDateArgs = parse_payload(payload_json)?;
            get_daily_log(state, &args.project_id, &args.log_date)
        }
        "list_daily_logs" => {
            let args: ProjectArgs = parse_payload(payload_json)?;
            list_daily_logs(state, &args.project_id)
        }

        other => {
            tracing::warn!(command = other, "未知命令");
            let mut resp = ErrorResponse::new("UNKNOWN_COMMAND", format!("未知命令: {}", other));
            resp.details = Some(serde_json::json!({ "available": COMMANDS }));
            Err(resp.to_json())
        }
    }
}
