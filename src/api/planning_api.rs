// ==========================================
// 节拍排程内核 - 计划逻辑 API
// ==========================================
// 职责: 关系查询 / 目录诊断 / 环诊断 / 工种排序 / 可行性检查 / 最早时间前推
// 红线: 宽松排序遇环不报错 (回退输入顺序), 只有严格排序与诊断暴露环
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_non_empty;
use crate::domain::relationship::{ActivityRelationshipTemplate, ActivityWindow, FeasibilityReport};
use crate::domain::types::{Discipline, ProjectType};
use crate::engine::{ConstraintChecker, DependencyGraphEngine, RelationshipLibrary};

// ==========================================
// 请求 / 响应 DTO
// ==========================================

/// 工种排序请求
///
/// `relationships` 为空时使用关系库按 `project_type` 过滤的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRequest {
    pub trade_codes: Vec<String>,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub relationships: Option<Vec<ActivityRelationshipTemplate>>,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResponse {
    pub order: Vec<String>,
    pub relationships_used: usize,
    pub fallback_to_input: bool, // 宽松模式下因环回退
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub has_cycle: bool,
    pub nodes: Vec<String>,
}

/// 项目类型下生效的关系目录概况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOverview {
    pub project_type: ProjectType,
    pub extensions: Vec<String>,
    pub trade_codes: Vec<String>,
    pub relationship_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeasibilityRequest {
    pub windows: Vec<ActivityWindow>,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub relationships: Option<Vec<ActivityRelationshipTemplate>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarliestScheduleRequest {
    pub order: Vec<String>,
    pub durations: BTreeMap<String, i64>,
    pub zone_ids: Vec<String>,
    #[serde(default)]
    pub project_type: ProjectType,
    #[serde(default)]
    pub relationships: Option<Vec<ActivityRelationshipTemplate>>,
    #[serde(default)]
    pub include_optional: bool,
}

// ==========================================
// PlanningApi
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct PlanningApi {
    library: RelationshipLibrary,
    graph: DependencyGraphEngine,
    checker: ConstraintChecker,
}

impl PlanningApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve_relationships(
        &self,
        codes: &[String],
        project_type: ProjectType,
        explicit: Option<Vec<ActivityRelationshipTemplate>>,
    ) -> Vec<ActivityRelationshipTemplate> {
        explicit.unwrap_or_else(|| self.library.templates_for_trades(codes, project_type))
    }

    /// 当前工种集合适用的关系 (两端都在集合内)
    pub fn relationships_for_trades(
        &self,
        trade_codes: &[String],
        project_type: ProjectType,
    ) -> ApiResult<Vec<ActivityRelationshipTemplate>> {
        for code in trade_codes {
            require_non_empty("trade_code", code)?;
        }
        Ok(self.library.templates_for_trades(trade_codes, project_type))
    }

    /// 工种内部细分工序链 (未登记工种返回空)
    pub fn sub_activities(&self, trade_code: &str) -> ApiResult<Vec<ActivityRelationshipTemplate>> {
        require_non_empty("trade_code", trade_code)?;
        Ok(self.library.sub_activity_relationships(trade_code))
    }

    pub fn catalog_overview(&self, project_type: ProjectType) -> CatalogOverview {
        CatalogOverview {
            project_type,
            extensions: self
                .library
                .extension_names(project_type)
                .into_iter()
                .map(str::to_string)
                .collect(),
            trade_codes: self.library.trade_codes(project_type),
            relationship_count: self.library.all_templates(project_type).len(),
        }
    }

    /// 单专业基础关系
    pub fn discipline_templates(&self, discipline: Discipline) -> Vec<ActivityRelationshipTemplate> {
        self.library.templates_for_discipline(discipline)
    }

    /// 环诊断
    pub fn cycle_diagnostics(&self, relationships: &[ActivityRelationshipTemplate]) -> CycleReport {
        let nodes: Vec<String> = self.graph.detect_cycles(relationships).into_iter().collect();
        CycleReport {
            has_cycle: !nodes.is_empty(),
            nodes,
        }
    }

    /// 工种排序
    ///
    /// # 返回
    /// - strict=false: 始终成功, 有环时回退为输入顺序
    /// - strict=true: 有环时 Err(CycleDetected)
    pub fn sequence_trades(&self, request: SequenceRequest) -> ApiResult<SequenceResponse> {
        if request.trade_codes.is_empty() {
            return Err(ApiError::ValidationError("trade_codes 不能为空".to_string()));
        }
        for code in &request.trade_codes {
            require_non_empty("trade_code", code)?;
        }

        let relationships =
            self.resolve_relationships(&request.trade_codes, request.project_type, request.relationships);

        let order = if request.strict {
            self.graph
                .topological_sort_strict(&request.trade_codes, &relationships)?
        } else {
            self.graph.topological_sort(&request.trade_codes, &relationships)
        };

        // 宽松模式下结果与输入相同且图中有环 → 回退
        let fallback_to_input = !request.strict
            && order == request.trade_codes
            && !self.graph.detect_cycles(&relationships).is_empty();

        info!(
            trades = order.len(),
            relationships = relationships.len(),
            strict = request.strict,
            fallback_to_input = fallback_to_input,
            "工种排序完成"
        );

        Ok(SequenceResponse {
            order,
            relationships_used: relationships.len(),
            fallback_to_input,
        })
    }

    /// 可行性检查
    pub fn check_feasibility(&self, request: FeasibilityRequest) -> ApiResult<FeasibilityReport> {
        for w in &request.windows {
            require_non_empty("trade_code", &w.trade_code)?;
            require_non_empty("zone_id", &w.zone_id)?;
            if w.finish < w.start {
                return Err(ApiError::ValidationError(format!(
                    "作业窗口 {}@{} 完成早于开始",
                    w.trade_code, w.zone_id
                )));
            }
        }

        let mut codes: Vec<String> = Vec::new();
        for w in &request.windows {
            if !codes.contains(&w.trade_code) {
                codes.push(w.trade_code.clone());
            }
        }
        let relationships = self.resolve_relationships(&codes, request.project_type, request.relationships);

        Ok(self.checker.check_feasibility(&request.windows, &relationships))
    }

    /// 最早时间前推
    pub fn earliest_schedule(&self, request: EarliestScheduleRequest) -> ApiResult<Vec<ActivityWindow>> {
        if request.order.is_empty() {
            return Err(ApiError::ValidationError("order 不能为空".to_string()));
        }
        if request.zone_ids.is_empty() {
            return Err(ApiError::ValidationError("zone_ids 不能为空".to_string()));
        }

        let relationships = self.resolve_relationships(&request.order, request.project_type, request.relationships);
        let durations: HashMap<String, i64> = request.durations.into_iter().collect();

        Ok(self.checker.earliest_schedule(
            &request.order,
            &durations,
            &request.zone_ids,
            &relationships,
            request.include_optional,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_catalog_overview_counts_extensions() {
        let api = PlanningApi::new();
        let general = api.catalog_overview(ProjectType::General);
        let hospital = api.catalog_overview(ProjectType::Hospital);

        assert_eq!(hospital.extensions, codes(&["commercial", "hospital"]));
        assert!(hospital.relationship_count > general.relationship_count);
        assert!(general.trade_codes.contains(&"COLUMNS".to_string()));

        let electrical = api.discipline_templates(Discipline::Electrical);
        assert!(!electrical.is_empty());
        assert!(electrical.len() < general.relationship_count);
    }

    #[test]
    fn test_sequence_uses_catalog() {
        let api = PlanningApi::new();
        let resp = api
            .sequence_trades(SequenceRequest {
                trade_codes: codes(&["PAINTING", "DRYWALL", "SLABS", "HVAC_ROUGH_IN"]),
                project_type: ProjectType::General,
                relationships: None,
                strict: true,
            })
            .unwrap();

        let pos = |c: &str| resp.order.iter().position(|o| o == c).unwrap();
        assert!(pos("SLABS") < pos("HVAC_ROUGH_IN"));
        assert!(pos("HVAC_ROUGH_IN") < pos("DRYWALL"));
        assert!(pos("DRYWALL") < pos("PAINTING"));
        assert!(!resp.fallback_to_input);
    }

    #[test]
    fn test_cycle_behaviour_lenient_vs_strict() {
        let api = PlanningApi::new();
        let cyclic = vec![
            ActivityRelationshipTemplate::finish_to_start("A", "B", 0),
            ActivityRelationshipTemplate::finish_to_start("B", "A", 0),
        ];

        let lenient = api
            .sequence_trades(SequenceRequest {
                trade_codes: codes(&["B", "A"]),
                project_type: ProjectType::General,
                relationships: Some(cyclic.clone()),
                strict: false,
            })
            .unwrap();
        assert_eq!(lenient.order, codes(&["B", "A"]));
        assert!(lenient.fallback_to_input);

        let strict = api.sequence_trades(SequenceRequest {
            trade_codes: codes(&["B", "A"]),
            project_type: ProjectType::General,
            relationships: Some(cyclic.clone()),
            strict: true,
        });
        assert!(matches!(strict, Err(ApiError::CycleDetected { .. })));

        let report = api.cycle_diagnostics(&cyclic);
        assert!(report.has_cycle);
        assert_eq!(report.nodes, codes(&["A", "B"]));
    }

    #[test]
    fn test_earliest_schedule_with_catalog_lags() {
        let api = PlanningApi::new();
        let windows = api
            .earliest_schedule(EarliestScheduleRequest {
                order: codes(&["FOUNDATION", "COLUMNS"]),
                durations: [("FOUNDATION".to_string(), 5), ("COLUMNS".to_string(), 4)]
                    .into_iter()
                    .collect(),
                zone_ids: codes(&["Z1"]),
                project_type: ProjectType::General,
                relationships: None,
                include_optional: false,
            })
            .unwrap();

        // FOUNDATION → COLUMNS 为 FS+7
        assert_eq!(windows[1].start, 12);
        assert_eq!(windows[1].finish, 16);
    }

    #[test]
    fn test_feasibility_validates_windows() {
        let api = PlanningApi::new();
        let result = api.check_feasibility(FeasibilityRequest {
            windows: vec![ActivityWindow::new("SLABS", "Z1", 5, 2)],
            project_type: ProjectType::General,
            relationships: None,
        });
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }
}
