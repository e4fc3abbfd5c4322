// ==========================================
// 节拍排程内核 - 逻辑关系约束语义
// ==========================================
// FS: 后继开始 >= 前驱完成 + lag
// SS: 后继开始 >= 前驱开始 + lag
// FF: 后继完成 >= 前驱完成 + lag
// SF: 后继完成 >= 前驱开始 + lag
// ==========================================
// 红线: 每条关系按区域各实例化一次
// 红线: 非强制关系只产生提示,不影响可行性结论
// ==========================================

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::relationship::{
    ActivityRelationshipTemplate, ActivityWindow, ConstraintViolation, FeasibilityReport,
};
use crate::domain::types::RelationshipType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("工种缺少作业时长: {0}")]
    MissingDuration(String),

    #[error("工种作业时长不能为负: {code}={duration}")]
    NegativeDuration { code: String, duration: i64 },
}

/// 关系对后继开始时间的下界
///
/// FF/SF 约束的是后继完成时间,换算为开始时间需减去后继时长
pub fn successor_start_bound(
    relationship_type: RelationshipType,
    predecessor: &ActivityWindow,
    successor_duration: i64,
    lag_days: i32,
) -> i64 {
    let lag = i64::from(lag_days);
    match relationship_type {
        RelationshipType::FinishToStart => predecessor.finish + lag,
        RelationshipType::StartToStart => predecessor.start + lag,
        RelationshipType::FinishToFinish => predecessor.finish + lag - successor_duration,
        RelationshipType::StartToFinish => predecessor.start + lag - successor_duration,
    }
}

/// 判定单个关系实例
///
/// # 返回
/// (required, actual): 约束要求的最早值与实际值; actual >= required 即满足
pub fn evaluate(
    relationship_type: RelationshipType,
    predecessor: &ActivityWindow,
    successor: &ActivityWindow,
    lag_days: i32,
) -> (i64, i64) {
    let lag = i64::from(lag_days);
    match relationship_type {
        RelationshipType::FinishToStart => (predecessor.finish + lag, successor.start),
        RelationshipType::StartToStart => (predecessor.start + lag, successor.start),
        RelationshipType::FinishToFinish => (predecessor.finish + lag, successor.finish),
        RelationshipType::StartToFinish => (predecessor.start + lag, successor.finish),
    }
}

// ==========================================
// ConstraintChecker - 约束检查器
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintChecker;

impl ConstraintChecker {
    pub fn new() -> Self {
        Self
    }

    /// 可行性检查
    ///
    /// # 参数
    /// - `windows`: 各 (工种, 区域) 的作业窗口
    /// - `relationships`: 关系模板
    ///
    /// # 返回
    /// 强制关系违反 → `violations` 且 `feasible = false`;
    /// 非强制关系违反 → `advisories`
    pub fn check_feasibility(
        &self,
        windows: &[ActivityWindow],
        relationships: &[ActivityRelationshipTemplate],
    ) -> FeasibilityReport {
        let mut by_key: HashMap<(&str, &str), &ActivityWindow> = HashMap::new();
        let mut zones: Vec<&str> = Vec::new();
        for w in windows {
            if !zones.contains(&w.zone_id.as_str()) {
                zones.push(w.zone_id.as_str());
            }
            by_key.insert((w.trade_code.as_str(), w.zone_id.as_str()), w);
        }

        let mut checked = 0usize;
        let mut violations = Vec::new();
        let mut advisories = Vec::new();

        for r in relationships {
            for &zone in &zones {
                let (Some(pred), Some(succ)) = (
                    by_key.get(&(r.predecessor_code.as_str(), zone)),
                    by_key.get(&(r.successor_code.as_str(), zone)),
                ) else {
                    continue;
                };
                checked += 1;

                let (required, actual) = evaluate(r.relationship_type, pred, succ, r.lag_days);
                if actual >= required {
                    continue;
                }

                let violation = ConstraintViolation {
                    zone_id: zone.to_string(),
                    predecessor_code: r.predecessor_code.clone(),
                    successor_code: r.successor_code.clone(),
                    relationship_type: r.relationship_type,
                    lag_days: r.lag_days,
                    mandatory: r.mandatory,
                    required,
                    actual,
                    reason: format!(
                        "区域{}: {} {} {} (lag={}) 要求 >= {}, 实际 {}",
                        zone,
                        r.predecessor_code,
                        r.relationship_type,
                        r.successor_code,
                        r.lag_days,
                        required,
                        actual
                    ),
                };

                if r.mandatory {
                    violations.push(violation);
                } else {
                    advisories.push(violation);
                }
            }
        }

        let report = FeasibilityReport {
            feasible: violations.is_empty(),
            checked_instances: checked,
            violations,
            advisories,
        };

        info!(
            checked_instances = report.checked_instances,
            violations = report.violations.len(),
            advisories = report.advisories.len(),
            feasible = report.feasible,
            "约束可行性检查完成"
        );

        report
    }

    /// 最早时间前推
    ///
    /// 每个区域内按 `order` 依次排定工种:
    /// 最早开始 = max(0, 同工种上一区域完成, 各适用关系给出的下界)
    ///
    /// # 参数
    /// - `include_optional`: 是否让非强制关系参与前推
    pub fn earliest_schedule(
        &self,
        order: &[String],
        durations: &HashMap<String, i64>,
        zone_ids: &[String],
        relationships: &[ActivityRelationshipTemplate],
        include_optional: bool,
    ) -> Result<Vec<ActivityWindow>, ConstraintError> {
        for code in order {
            match durations.get(code) {
                None => return Err(ConstraintError::MissingDuration(code.clone())),
                Some(&d) if d < 0 => {
                    return Err(ConstraintError::NegativeDuration {
                        code: code.clone(),
                        duration: d,
                    })
                }
                Some(_) => {}
            }
        }

        let mut previous_finish: HashMap<&str, i64> = HashMap::new();
        let mut windows = Vec::with_capacity(order.len() * zone_ids.len());

        for zone in zone_ids {
            let mut in_zone: HashMap<&str, ActivityWindow> = HashMap::new();

            for code in order {
                let duration = durations[code];
                let mut start = previous_finish.get(code.as_str()).copied().unwrap_or(0).max(0);

                for r in relationships
                    .iter()
                    .filter(|r| r.successor_code == *code && (r.mandatory || include_optional))
                {
                    if let Some(pred) = in_zone.get(r.predecessor_code.as_str()) {
                        start = start.max(successor_start_bound(
                            r.relationship_type,
                            pred,
                            duration,
                            r.lag_days,
                        ));
                    }
                }

                let window = ActivityWindow::new(code.clone(), zone.clone(), start, start + duration);
                previous_finish.insert(code.as_str(), window.finish);
                in_zone.insert(code.as_str(), window.clone());
                windows.push(window);
            }
        }

        debug!(
            trades = order.len(),
            zones = zone_ids.len(),
            windows = windows.len(),
            "最早时间前推完成"
        );

        Ok(windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(code: &str, zone: &str, start: i64, finish: i64) -> ActivityWindow {
        ActivityWindow::new(code, zone, start, finish)
    }

    fn rel(kind: RelationshipType, lag: i32, mandatory: bool) -> ActivityRelationshipTemplate {
        let r = ActivityRelationshipTemplate::finish_to_start("A", "B", lag).with_type(kind);
        if mandatory {
            r
        } else {
            r.optional()
        }
    }

    #[test]
    fn test_four_relationship_types() {
        let pred = window("A", "Z1", 0, 5);

        // FS: 后继开始 >= 5 + 2
        assert_eq!(evaluate(RelationshipType::FinishToStart, &pred, &window("B", "Z1", 7, 9), 2), (7, 7));
        // SS 负 lag 搭接: 后继开始 >= 0 - 1
        assert_eq!(evaluate(RelationshipType::StartToStart, &pred, &window("B", "Z1", 0, 3), -1), (-1, 0));
        // FF: 后继完成 >= 5 + 1
        assert_eq!(evaluate(RelationshipType::FinishToFinish, &pred, &window("B", "Z1", 2, 5), 1), (6, 5));
        // SF: 后继完成 >= 0 + 3
        assert_eq!(evaluate(RelationshipType::StartToFinish, &pred, &window("B", "Z1", 0, 3), 3), (3, 3));
    }

    #[test]
    fn test_successor_start_bound_converts_finish_constraints() {
        let pred = window("A", "Z1", 2, 6);
        assert_eq!(successor_start_bound(RelationshipType::FinishToStart, &pred, 4, 1), 7);
        assert_eq!(successor_start_bound(RelationshipType::StartToStart, &pred, 4, 1), 3);
        assert_eq!(successor_start_bound(RelationshipType::FinishToFinish, &pred, 4, 1), 3);
        assert_eq!(successor_start_bound(RelationshipType::StartToFinish, &pred, 4, 0), -2);
    }

    #[test]
    fn test_optional_violation_never_blocks_feasibility() {
        let checker = ConstraintChecker::new();
        let windows = vec![window("A", "Z1", 0, 5), window("B", "Z1", 3, 8)];

        let report = checker.check_feasibility(&windows, &[rel(RelationshipType::FinishToStart, 0, false)]);
        assert!(report.feasible);
        assert_eq!(report.advisories.len(), 1);
        assert!(report.violations.is_empty());

        let report = checker.check_feasibility(&windows, &[rel(RelationshipType::FinishToStart, 0, true)]);
        assert!(!report.feasible);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].required, 5);
        assert_eq!(report.violations[0].actual, 3);
    }

    #[test]
    fn test_relationship_instantiates_once_per_zone() {
        let checker = ConstraintChecker::new();
        let windows = vec![
            window("A", "Z1", 0, 5),
            window("B", "Z1", 5, 10),
            window("A", "Z2", 5, 10),
            window("B", "Z2", 8, 13),
            window("A", "Z3", 10, 15),
        ];
        let report = checker.check_feasibility(&windows, &[rel(RelationshipType::FinishToStart, 0, true)]);

        // Z3 缺少后继,不实例化
        assert_eq!(report.checked_instances, 2);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].zone_id, "Z2");
    }

    #[test]
    fn test_earliest_schedule_forward_pass() {
        let checker = ConstraintChecker::new();
        let order = vec!["A".to_string(), "B".to_string()];
        let durations: HashMap<String, i64> = [("A".to_string(), 5), ("B".to_string(), 3)].into_iter().collect();
        let zones = vec!["Z1".to_string(), "Z2".to_string()];
        let rels = vec![rel(RelationshipType::FinishToStart, 1, true)];

        let windows = checker.earliest_schedule(&order, &durations, &zones, &rels, false).unwrap();
        assert_eq!(
            windows,
            vec![
                window("A", "Z1", 0, 5),
                window("B", "Z1", 6, 9),
                window("A", "Z2", 5, 10),
                window("B", "Z2", 11, 14),
            ]
        );

        // 前推结果自身必然可行
        assert!(checker.check_feasibility(&windows, &rels).feasible);
    }

    #[test]
    fn test_earliest_schedule_skips_optional_unless_requested() {
        let checker = ConstraintChecker::new();
        let order = vec!["A".to_string(), "B".to_string()];
        let durations: HashMap<String, i64> = [("A".to_string(), 5), ("B".to_string(), 3)].into_iter().collect();
        let zones = vec!["Z1".to_string()];
        let rels = vec![rel(RelationshipType::FinishToStart, 0, false)];

        let without = checker.earliest_schedule(&order, &durations, &zones, &rels, false).unwrap();
        assert_eq!(without[1].start, 0);
        let with = checker.earliest_schedule(&order, &durations, &zones, &rels, true).unwrap();
        assert_eq!(with[1].start, 5);
    }

    #[test]
    fn test_earliest_schedule_requires_durations() {
        let checker = ConstraintChecker::new();
        let err = checker
            .earliest_schedule(&["A".to_string()], &HashMap::new(), &["Z1".to_string()], &[], false)
            .unwrap_err();
        assert_eq!(err, ConstraintError::MissingDuration("A".to_string()));
    }
}
