// ==========================================
// 节拍排程内核 - 活动逻辑关系模板
// ==========================================
// 关系按区域实例化: 每个区域各一份逻辑约束
// lag_days: 正数为延迟, 负数为搭接
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::RelationshipType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRelationshipTemplate {
    pub predecessor_code: String,
    pub successor_code: String,
    pub relationship_type: RelationshipType,
    pub lag_days: i32,
    pub mandatory: bool,
    pub description: String,
}

impl ActivityRelationshipTemplate {
    /// 创建强制 FS 关系 (最常见形式)
    pub fn finish_to_start(
        predecessor_code: impl Into<String>,
        successor_code: impl Into<String>,
        lag_days: i32,
    ) -> Self {
        Self {
            predecessor_code: predecessor_code.into(),
            successor_code: successor_code.into(),
            relationship_type: RelationshipType::FinishToStart,
            lag_days,
            mandatory: true,
            description: String::new(),
        }
    }

    pub fn with_type(mut self, relationship_type: RelationshipType) -> Self {
        self.relationship_type = relationship_type;
        self
    }

    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn involves(&self, code: &str) -> bool {
        self.predecessor_code == code || self.successor_code == code
    }
}

// ==========================================
// ActivityWindow - 单区域单工种的作业窗口
// ==========================================
// start/finish 以天为单位的相对偏移
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWindow {
    pub trade_code: String,
    pub zone_id: String,
    pub start: i64,
    pub finish: i64,
}

impl ActivityWindow {
    pub fn new(trade_code: impl Into<String>, zone_id: impl Into<String>, start: i64, finish: i64) -> Self {
        Self {
            trade_code: trade_code.into(),
            zone_id: zone_id.into(),
            start,
            finish,
        }
    }

    pub fn duration(&self) -> i64 {
        self.finish - self.start
    }
}

// ==========================================
// ConstraintViolation - 约束违反明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub zone_id: String,
    pub predecessor_code: String,
    pub successor_code: String,
    pub relationship_type: RelationshipType,
    pub lag_days: i32,
    pub mandatory: bool,
    pub required: i64, // 约束要求的最早值
    pub actual: i64,   // 实际值
    pub reason: String,
}

// ==========================================
// FeasibilityReport - 可行性检查结果
// ==========================================
// feasible 只由强制关系决定; 非强制关系只产生提示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityReport {
    pub feasible: bool,
    pub checked_instances: usize,
    pub violations: Vec<ConstraintViolation>,
    pub advisories: Vec<ConstraintViolation>,
}
