// ==========================================
// 依赖图 + 关系库集成测试
// ==========================================
// 职责: 验证拓扑顺序满足全部前驱, 环时宽松/严格两种行为
// ==========================================

use takt_planner::domain::relationship::ActivityRelationshipTemplate;
use takt_planner::domain::types::ProjectType;
use takt_planner::engine::{DependencyGraphEngine, GraphError, RelationshipLibrary};

fn position(order: &[String], code: &str) -> usize {
    order.iter().position(|c| c == code).unwrap()
}

fn assert_edges_respected(order: &[String], relationships: &[ActivityRelationshipTemplate]) {
    for r in relationships {
        assert!(
            position(order, &r.predecessor_code) < position(order, &r.successor_code),
            "{} 应排在 {} 之前: {:?}",
            r.predecessor_code,
            r.successor_code,
            order
        );
    }
}

#[test]
fn test_catalog_order_respects_every_edge() {
    let library = RelationshipLibrary::new();
    let engine = DependencyGraphEngine::new();

    for project_type in [
        ProjectType::General,
        ProjectType::Residential,
        ProjectType::Commercial,
        ProjectType::Hospital,
    ] {
        // 反转目录顺序作为输入, 排序结果不应依赖输入恰好有序
        let mut codes = library.trade_codes(project_type);
        codes.reverse();
        let relationships = library.templates_for_trades(&codes, project_type);

        let order = engine.topological_sort(&codes, &relationships);
        assert_eq!(order.len(), codes.len());
        assert_edges_respected(&order, &relationships);

        let strict = engine.topological_sort_strict(&codes, &relationships).unwrap();
        assert_eq!(strict, order);
    }
}

#[test]
fn test_subset_only_uses_internal_edges() {
    let library = RelationshipLibrary::new();
    let engine = DependencyGraphEngine::new();

    let codes = vec![
        "PAINTING".to_string(),
        "DRYWALL".to_string(),
        "FOUNDATION".to_string(),
    ];
    let relationships = library.templates_for_trades(&codes, ProjectType::General);
    for r in &relationships {
        assert!(codes.contains(&r.predecessor_code));
        assert!(codes.contains(&r.successor_code));
    }

    let order = engine.topological_sort(&codes, &relationships);
    assert_eq!(order.len(), 3);
    assert_edges_respected(&order, &relationships);
}

#[test]
fn test_cycle_falls_back_to_input_order() {
    let engine = DependencyGraphEngine::new();
    let codes = vec!["X".to_string(), "A".to_string(), "B".to_string(), "C".to_string()];
    let relationships = vec![
        ActivityRelationshipTemplate::finish_to_start("A", "B", 0),
        ActivityRelationshipTemplate::finish_to_start("B", "C", 0),
        ActivityRelationshipTemplate::finish_to_start("C", "A", 0),
    ];

    assert_eq!(engine.topological_sort(&codes, &relationships), codes);

    let cycle = engine.detect_cycles(&relationships);
    assert!(!cycle.is_empty());
    assert!(cycle.iter().any(|c| ["A", "B", "C"].contains(&c.as_str())));
    assert!(!cycle.contains("X"));

    match engine.topological_sort_strict(&codes, &relationships) {
        Err(GraphError::CycleDetected { nodes }) => assert!(!nodes.is_empty()),
        other => panic!("期望 CycleDetected, 实际 {:?}", other),
    }
}

#[test]
fn test_unrelated_codes_keep_input_order() {
    let engine = DependencyGraphEngine::new();
    let codes = vec!["Q".to_string(), "P".to_string(), "R".to_string()];
    assert_eq!(engine.topological_sort(&codes, &[]), codes);
}
