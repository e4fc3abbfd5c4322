// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: config_kv 覆写 / 格式错误回退 / 不一致拒绝 / 生效到 AppState
// ==========================================


use takt_planner::api::ApiError;
use takt_planner::app::AppState;
use takt_planner::config::{config_keys, ConfigManager, PlanningConfig};
use test_helpers::{commitment_batch, create_test_db, open_shared_connection};

fn manager(db_path: &str) -> ConfigManager {
    ConfigManager::from_connection(open_shared_connection(db_path).unwrap())
        .expect("Failed to create ConfigManager")
}

#[test]
fn test_empty_table_yields_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = manager(&db_path).load_planning_config().unwrap();
    assert_eq!(config, PlanningConfig::default());
    assert!(manager(&db_path).get_config_snapshot().unwrap().is_empty());
}

#[test]
fn test_overrides_are_applied() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let cm = manager(&db_path);
    cm.set_global_config_value(config_keys::TODAY_RATIO, "0.5").unwrap();
    cm.set_global_config_value(config_keys::MAX_COMMITMENT_BATCH, "20").unwrap();
    // 重复写入为 upsert
    cm.set_global_config_value(config_keys::MAX_COMMITMENT_BATCH, "25").unwrap();

    let config = cm.load_planning_config().unwrap();
    assert_eq!(config.today_ratio, 0.5);
    assert_eq!(config.max_commitment_batch, 25);
    assert_eq!(config.variance_reason_limit, 10);

    let snapshot = cm.get_config_snapshot().unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get(config_keys::MAX_COMMITMENT_BATCH).map(String::as_str), Some("25"));
}

#[test]
fn test_malformed_value_falls_back_to_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let cm = manager(&db_path);
    cm.set_global_config_value(config_keys::MAX_TAKT_TIME, "abc").unwrap();

    let config = cm.load_planning_config().unwrap();
    assert_eq!(config.max_takt_time, PlanningConfig::default().max_takt_time);
}

#[test]
fn test_inconsistent_overrides_are_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let cm = manager(&db_path);
    cm.set_global_config_value(config_keys::BUFFER_WARNING_RATIO, "0.9").unwrap();

    assert!(cm.load_planning_config().is_err());
    assert!(AppState::with_sqlite(&db_path).is_err());
}

#[test]
fn test_oversized_limits_are_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let cm = manager(&db_path);
    cm.set_global_config_value(config_keys::MAX_BUFFER_SIZE, "4000000000").unwrap();

    assert!(cm.load_planning_config().is_err());
    assert!(AppState::with_sqlite(&db_path).is_err());
}

#[test]
fn test_batch_limit_override_reaches_commitment_api() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    manager(&db_path)
        .set_global_config_value(config_keys::MAX_COMMITMENT_BATCH, "5")
        .unwrap();

    let state = AppState::with_sqlite(&db_path).unwrap();
    assert_eq!(state.config.max_commitment_batch, 5);
    assert!(matches!(
        state.commitment_api.bulk_create(commitment_batch("p1", 6, 0)),
        Err(ApiError::ValidationError(_))
    ));
    assert_eq!(state.commitment_api.bulk_create(commitment_batch("p1", 5, 0)).unwrap().len(), 5);
}

#[test]
fn test_today_ratio_override_moves_cursor() {
    let config = PlanningConfig {
        today_ratio: 0.0,
        ..Default::default()
    };
    let state = AppState::in_memory_with_config(config);
    let f = state
        .flowline_api
        .generate(takt_planner::api::GenerateFlowlineRequest {
            plan_id: "plan-1".to_string(),
            zones: test_helpers::zones_abc(),
            trades: test_helpers::structure_and_mep(),
            takt_time: 5,
            buffer_size: 1,
            today_x: None,
            sequence_by_dependencies: false,
            project_type: Default::default(),
        })
        .unwrap();
    assert_eq!(f.today_x, 0.0);
}
