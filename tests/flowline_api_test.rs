// ==========================================
// FlowlineApi 集成测试
// ==========================================
// 测试目标: 生成 / 查询 / 删除 / 缓冲 / 进度叠加
// ==========================================


use takt_planner::api::{ApiError, GenerateFlowlineRequest};
use takt_planner::app::AppState;
use takt_planner::domain::progress::ProgressUpdate;
use takt_planner::domain::types::{BufferStatus, ProgressStatus, ProjectType, SegmentStatus};
use test_helpers::{structure_and_mep, zones_abc};

fn request(plan_id: &str, buffer_size: u32) -> GenerateFlowlineRequest {
    GenerateFlowlineRequest {
        plan_id: plan_id.to_string(),
        zones: zones_abc(),
        trades: structure_and_mep(),
        takt_time: 5,
        buffer_size,
        today_x: None,
        sequence_by_dependencies: false,
        project_type: ProjectType::General,
    }
}

fn ranges(state: &AppState, plan_id: &str, trade_id: &str) -> Vec<(u32, u32)> {
    let f = state.flowline_api.get(plan_id).unwrap();
    f.wagon_by_trade_id(trade_id)
        .unwrap()
        .segments
        .iter()
        .map(|s| (s.x_start, s.x_end))
        .collect()
}

#[test]
fn test_generate_reference_scenario_and_read_back() {
    let state = AppState::in_memory();
    let f = state.flowline_api.generate(request("plan-1", 1)).unwrap();

    assert_eq!(f.total_periods, 5);
    assert!((f.today_x - 2.25).abs() < 1e-9);
    assert_eq!(ranges(&state, "plan-1", "t-str"), vec![(0, 5), (5, 10), (10, 15)]);
    assert_eq!(ranges(&state, "plan-1", "t-mep"), vec![(2, 7), (7, 12), (12, 17)]);

    for s in f.wagons.iter().flat_map(|w| &w.segments) {
        assert_eq!(s.x_end - s.x_start, 5);
    }
}

#[test]
fn test_regenerate_is_deterministic_and_replaces() {
    let state = AppState::in_memory();
    let a = state.flowline_api.generate(request("plan-1", 1)).unwrap();
    let b = state.flowline_api.generate(request("plan-1", 1)).unwrap();
    assert_eq!(
        serde_json::to_string(&a.wagons).unwrap(),
        serde_json::to_string(&b.wagons).unwrap()
    );

    // 同一 plan 再生成整体替换
    state.flowline_api.generate(request("plan-1", 3)).unwrap();
    assert_eq!(state.flowline_api.get("plan-1").unwrap().buffer_size, 3);
}

#[test]
fn test_get_missing_is_not_found_and_delete_is_idempotent() {
    let state = AppState::in_memory();
    assert!(matches!(state.flowline_api.get("nope"), Err(ApiError::NotFound(_))));

    state.flowline_api.generate(request("plan-1", 1)).unwrap();
    assert!(state.flowline_api.delete("plan-1").unwrap());
    assert!(!state.flowline_api.delete("plan-1").unwrap());
    assert!(matches!(state.flowline_api.get("plan-1"), Err(ApiError::NotFound(_))));
}

#[test]
fn test_invalid_request_is_rejected_without_write() {
    let state = AppState::in_memory();
    let mut bad = request("plan-1", 1);
    bad.takt_time = 0;
    assert!(matches!(state.flowline_api.generate(bad), Err(ApiError::ValidationError(_))));
    assert!(state.flowline_api.get("plan-1").is_err());
}

#[test]
fn test_buffers_zero_size_is_always_healthy() {
    let state = AppState::in_memory();
    state.flowline_api.generate(request("plan-0", 0)).unwrap();

    let buffers = state.flowline_api.buffers("plan-0").unwrap();
    assert_eq!(buffers.len(), 1);
    assert_eq!(buffers[0].ratio, 0.0);
    assert_eq!(buffers[0].status, BufferStatus::Healthy);
    assert!(buffers[0].gap < 0);
}

#[test]
fn test_buffers_overlapping_trades_are_critical() {
    let state = AppState::in_memory();
    state.flowline_api.generate(request("plan-1", 1)).unwrap();

    let buffers = state.flowline_api.buffers("plan-1").unwrap();
    // 结构最晚结束 15, 机电最早开始 2
    assert_eq!(buffers[0].gap, -13);
    assert_eq!(buffers[0].consumed, 14);
    assert_eq!(buffers[0].status, BufferStatus::Critical);
    assert_eq!(buffers[0].trade_pair, "结构 → 机电");
}

#[test]
fn test_progress_overlay_and_completion() {
    let state = AppState::in_memory();
    state.flowline_api.generate(request("plan-1", 1)).unwrap();

    let update = |zone: &str, pct: f64, status: Option<ProgressStatus>| ProgressUpdate {
        assignment_id: "plan-1".to_string(),
        zone_id: zone.to_string(),
        trade_id: "t-str".to_string(),
        percent_complete: pct,
        status,
        note: None,
    };

    let first = state.flowline_api.record_progress(update("A", 40.0, None)).unwrap();
    assert_eq!(first.status, ProgressStatus::InProgress);

    let done = state.flowline_api.record_progress(update("A", 100.0, None)).unwrap();
    assert_eq!(done.status, ProgressStatus::Completed);
    assert_eq!(done.previous_percent, 40.0);

    state
        .flowline_api
        .record_progress(update("B", 20.0, Some(ProgressStatus::Delayed)))
        .unwrap();

    let bad = state.flowline_api.record_progress(update("C", 120.0, None));
    assert!(matches!(bad, Err(ApiError::ValidationError(_))));

    let overlaid = state.flowline_api.flowline_with_progress("plan-1").unwrap();
    let structure = overlaid.wagon_by_trade_id("t-str").unwrap();
    assert_eq!(structure.segments[0].status, SegmentStatus::Completed);
    assert_eq!(structure.segments[1].status, SegmentStatus::Delayed);
    assert_eq!(structure.segments[2].status, SegmentStatus::Planned);

    assert_eq!(state.flowline_api.list_progress("plan-1").unwrap().len(), 2);
}
