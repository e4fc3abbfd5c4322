// ==========================================
// 节拍排程内核 - 活动关系模板库
// ==========================================
// 职责: 只读关系目录,按专业组织,按项目类型追加扩展
// 输入: 当前工种集合 + 项目类型
// 输出: 两端工种均在集合内的关系子集 (目录顺序)
// ==========================================
// 红线: 不得泄漏引用缺席工种的关系
// ==========================================

mod base;
mod extensions;
mod sub_activity;

use std::collections::HashSet;
use tracing::debug;

use crate::domain::relationship::ActivityRelationshipTemplate;
use crate::domain::types::{Discipline, ProjectType, RelationshipType};

use base::{RuleDef, BASE_CATALOG};
use extensions::EXTENSIONS;

impl RuleDef {
    fn to_template(&self) -> ActivityRelationshipTemplate {
        ActivityRelationshipTemplate {
            predecessor_code: self.predecessor.to_string(),
            successor_code: self.successor.to_string(),
            relationship_type: self.kind,
            lag_days: self.lag_days,
            mandatory: self.mandatory,
            description: self.description.to_string(),
        }
    }
}

// ==========================================
// RelationshipLibrary - 关系模板库
// ==========================================
// 无状态: 目录为编译期常量
#[derive(Debug, Default, Clone, Copy)]
pub struct RelationshipLibrary;

impl RelationshipLibrary {
    pub fn new() -> Self {
        Self
    }

    /// 该项目类型下参与并集的全部规则 (基础目录在前,扩展按列表顺序在后)
    fn rules_for(&self, project_type: ProjectType) -> impl Iterator<Item = &'static RuleDef> {
        let base = BASE_CATALOG.iter().flat_map(|c| c.rules.iter());
        let extra = EXTENSIONS
            .iter()
            .filter(move |ext| ext.applies(project_type))
            .flat_map(|ext| ext.rules.iter());
        base.chain(extra)
    }

    /// 按工种集合过滤关系模板
    ///
    /// # 参数
    /// - `trade_codes`: 当前计划中的工种代码
    /// - `project_type`: 项目类型 (决定追加哪些扩展目录)
    ///
    /// # 返回
    /// 前驱与后继均在 `trade_codes` 中的关系,保持目录顺序
    pub fn templates_for_trades<S: AsRef<str>>(
        &self,
        trade_codes: &[S],
        project_type: ProjectType,
    ) -> Vec<ActivityRelationshipTemplate> {
        let active: HashSet<&str> = trade_codes.iter().map(|c| c.as_ref()).collect();

        let templates: Vec<ActivityRelationshipTemplate> = self
            .rules_for(project_type)
            .filter(|r| active.contains(r.predecessor) && active.contains(r.successor))
            .map(RuleDef::to_template)
            .collect();

        debug!(
            trade_count = active.len(),
            project_type = %project_type,
            matched = templates.len(),
            "关系模板过滤完成"
        );

        templates
    }

    /// 该项目类型下的完整目录
    pub fn all_templates(&self, project_type: ProjectType) -> Vec<ActivityRelationshipTemplate> {
        self.rules_for(project_type).map(RuleDef::to_template).collect()
    }

    /// 单专业基础目录
    pub fn templates_for_discipline(&self, discipline: Discipline) -> Vec<ActivityRelationshipTemplate> {
        BASE_CATALOG
            .iter()
            .filter(|c| c.discipline == discipline)
            .flat_map(|c| c.rules.iter())
            .map(RuleDef::to_template)
            .collect()
    }

    /// 目录中出现的全部工种代码 (首次出现顺序)
    pub fn trade_codes(&self, project_type: ProjectType) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut codes = Vec::new();
        for r in self.rules_for(project_type) {
            for code in [r.predecessor, r.successor] {
                if seen.insert(code) {
                    codes.push(code.to_string());
                }
            }
        }
        codes
    }

    /// 扩展目录名称 (用于诊断)
    pub fn extension_names(&self, project_type: ProjectType) -> Vec<&'static str> {
        EXTENSIONS
            .iter()
            .filter(|ext| ext.applies(project_type))
            .map(|ext| ext.name)
            .collect()
    }

    /// 工种内部细分工序链
    ///
    /// 相邻工序之间为强制 FS、零间隔关系; 未登记的工种返回空链
    pub fn sub_activity_relationships(&self, trade_code: &str) -> Vec<ActivityRelationshipTemplate> {
        let Some(steps) = sub_activity::chain_for(trade_code) else {
            return Vec::new();
        };

        steps
            .windows(2)
            .map(|pair| ActivityRelationshipTemplate {
                predecessor_code: pair[0].to_string(),
                successor_code: pair[1].to_string(),
                relationship_type: RelationshipType::FinishToStart,
                lag_days: 0,
                mandatory: true,
                description: format!("{}: {} → {}", trade_code, pair[0], pair[1]),
            })
            .collect()
    }
}
