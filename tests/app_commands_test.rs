// ==========================================
// JSON 命令层集成测试
// ==========================================
// 测试目标: 命令分发 / 载荷解析 / 错误码映射
// ==========================================


use serde_json::{json, Value};
use takt_planner::app::{dispatch, AppState, ErrorResponse, COMMANDS};
use test_helpers::commitment_batch;

fn ok(state: &AppState, command: &str, payload: Value) -> Value {
    let body = dispatch(state, command, &payload.to_string())
        .unwrap_or_else(|e| panic!("{} 失败: {}", command, e));
    serde_json::from_str(&body).unwrap()
}

fn err(state: &AppState, command: &str, payload: Value) -> ErrorResponse {
    let body = dispatch(state, command, &payload.to_string()).unwrap_err();
    serde_json::from_str(&body).unwrap()
}

#[test]
fn test_flowline_commands_round_trip() {
    let state = AppState::in_memory();
    let generated = ok(
        &state,
        "generate_flowline",
        json!({
            "plan_id": "plan-1",
            "zones": [
                {"id": "A", "name": "A区", "sequence": 1},
                {"id": "B", "name": "B区", "sequence": 2},
                {"id": "C", "name": "C区", "sequence": 3}
            ],
            "trades": [
                {"id": "t-str", "name": "结构", "color": "#3366cc", "code": "COLUMNS", "duration_days": 5},
                {"id": "t-mep", "name": "机电", "color": "#dc3912", "code": "HVAC_ROUGH_IN", "duration_days": 5}
            ],
            "takt_time": 5,
            "buffer_size": 1
        }),
    );
    assert_eq!(generated["total_periods"], 5);
    assert_eq!(generated["wagons"][1]["segments"][0]["x_start"], 2);

    let summary = ok(&state, "get_flowline_summary", json!({"plan_id": "plan-1"}));
    assert_eq!(summary["total_segments"], 6);

    let buffers = ok(&state, "get_buffers", json!({"plan_id": "plan-1"}));
    assert_eq!(buffers[0]["status"], "critical");

    let deleted = ok(&state, "delete_flowline", json!({"plan_id": "plan-1"}));
    assert_eq!(deleted["deleted"], true);
    let deleted = ok(&state, "delete_flowline", json!({"plan_id": "plan-1"}));
    assert_eq!(deleted["deleted"], false);

    let missing = err(&state, "get_flowline", json!({"plan_id": "plan-1"}));
    assert_eq!(missing.code, "NOT_FOUND");
}

#[test]
fn test_ppc_commands_and_no_commitments_details() {
    let state = AppState::in_memory();

    let missing = err(
        &state,
        "calculate_ppc",
        json!({"project_id": "p1", "week_start": "2026-03-02"}),
    );
    assert_eq!(missing.code, "NO_COMMITMENTS");
    let details = missing.details.unwrap();
    assert_eq!(details["project_id"], "p1");
    assert_eq!(details["week_start"], "2026-03-02");
    assert_eq!(ok(&state, "get_ppc_week", json!({"project_id": "p1", "week_start": "2026-03-02"})), Value::Null);

    let items = serde_json::to_value(commitment_batch("p1", 10, 7)).unwrap();
    let created = ok(&state, "bulk_create_commitments", json!({ "items": items }));
    assert_eq!(created.as_array().unwrap().len(), 10);

    let record = ok(
        &state,
        "calculate_ppc",
        json!({"project_id": "p1", "week_start": "2026-03-02"}),
    );
    assert_eq!(record["ppc_percent"], 70.0);

    let current = ok(&state, "get_current_ppc", json!({"project_id": "p1"}));
    assert_eq!(current["current"], 70.0);
    assert_eq!(current["trend"], Value::Null);

    let by_trade = ok(&state, "get_ppc_by_trade", json!({"project_id": "p1"}));
    assert_eq!(by_trade.as_array().unwrap().len(), 2);
}

#[test]
fn test_commitment_patch_command() {
    let state = AppState::in_memory();
    let items = serde_json::to_value(commitment_batch("p1", 1, 0)).unwrap();
    let created = ok(&state, "bulk_create_commitments", json!({ "items": items }));
    let id = created[0]["id"].as_str().unwrap().to_string();

    let patched = ok(
        &state,
        "patch_commitment",
        json!({"id": id, "patch": {"variance_reason": "等待验收", "variance_category": "inspection"}}),
    );
    assert_eq!(patched["variance_category"], "inspection");

    // 显式 null 清空误填的原因
    let cleared = ok(
        &state,
        "patch_commitment",
        json!({"id": id, "patch": {"variance_reason": null, "variance_category": null}}),
    );
    assert_eq!(cleared["variance_reason"], Value::Null);
    assert_eq!(cleared["variance_category"], Value::Null);

    // 补丁不接受不可变字段
    let rejected = err(
        &state,
        "patch_commitment",
        json!({"id": id, "patch": {"zone_id": "B"}}),
    );
    assert_eq!(rejected.code, "VALIDATION_ERROR");

    let listed = ok(
        &state,
        "list_commitments",
        json!({"project_id": "p1", "week_start": "2026-03-02"}),
    );
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[test]
fn test_planning_commands() {
    let state = AppState::in_memory();

    let sequenced = ok(
        &state,
        "sequence_trades",
        json!({"trade_codes": ["PAINTING", "DRYWALL"]}),
    );
    assert_eq!(sequenced["order"], json!(["DRYWALL", "PAINTING"]));

    let overview = ok(&state, "get_catalog_overview", json!({"project_type": "hospital"}));
    assert_eq!(overview["extensions"], json!(["commercial", "hospital"]));
    assert!(overview["relationship_count"].as_u64().unwrap() > 0);

    let electrical = ok(&state, "get_discipline_templates", json!({"discipline": "electrical"}));
    assert!(!electrical.as_array().unwrap().is_empty());
    let unknown = err(&state, "get_discipline_templates", json!({"discipline": "plumbing"}));
    assert_eq!(unknown.code, "VALIDATION_ERROR");

    let cycle = json!([
        {"predecessor_code": "A", "successor_code": "B", "relationship_type": "FS", "lag_days": 0, "mandatory": true, "description": ""},
        {"predecessor_code": "B", "successor_code": "A", "relationship_type": "FS", "lag_days": 0, "mandatory": true, "description": ""}
    ]);
    let report = ok(&state, "detect_cycles", json!({ "relationships": cycle }));
    assert_eq!(report["has_cycle"], true);

    let strict = err(
        &state,
        "sequence_trades",
        json!({"trade_codes": ["A", "B"], "relationships": cycle, "strict": true}),
    );
    assert_eq!(strict.code, "CYCLE_DETECTED");
    assert!(!strict.details.unwrap()["nodes"].as_array().unwrap().is_empty());

    let lenient = ok(
        &state,
        "sequence_trades",
        json!({"trade_codes": ["B", "A"], "relationships": cycle}),
    );
    assert_eq!(lenient["order"], json!(["B", "A"]));
    assert_eq!(lenient["fallback_to_input"], true);
}

#[test]
fn test_daily_log_commands_merge() {
    let state = AppState::in_memory();
    ok(
        &state,
        "submit_daily_log",
        json!({"project_id": "p1", "log_date": "2026-03-03", "weather": "晴"}),
    );
    ok(
        &state,
        "submit_daily_log",
        json!({"project_id": "p1", "log_date": "2026-03-03", "crew_count": 18}),
    );

    let log = ok(
        &state,
        "get_daily_log",
        json!({"project_id": "p1", "log_date": "2026-03-03"}),
    );
    assert_eq!(log["weather"], "晴");
    assert_eq!(log["crew_count"], 18);
    assert_eq!(ok(&state, "list_daily_logs", json!({"project_id": "p1"})).as_array().unwrap().len(), 1);
}

#[test]
fn test_bad_input_and_unknown_command() {
    let state = AppState::in_memory();

    let bad_date = err(
        &state,
        "calculate_ppc",
        json!({"project_id": "p1", "week_start": "03/02/2026"}),
    );
    assert_eq!(bad_date.code, "VALIDATION_ERROR");

    let body = dispatch(&state, "get_flowline", "{not json").unwrap_err();
    let resp: ErrorResponse = serde_json::from_str(&body).unwrap();
    assert_eq!(resp.code, "VALIDATION_ERROR");

    let unknown = err(&state, "launch_rocket", json!({}));
    assert_eq!(unknown.code, "UNKNOWN_COMMAND");
    assert_eq!(
        unknown.details.unwrap()["available"].as_array().unwrap().len(),
        COMMANDS.len()
    );
}
