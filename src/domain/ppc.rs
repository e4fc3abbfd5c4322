// ==========================================
// 节拍排程内核 - PPC (计划完成百分比) 领域模型
// ==========================================
// 红线: 每个 (project, week_start) 只有一条记录, 重算覆盖不追加
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::VarianceCategory;

// ==========================================
// PpcRecord - 周 PPC 记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpcRecord {
    pub project_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_committed: u32,
    pub total_completed: u32,
    pub ppc_percent: f64,
    pub by_trade: Vec<TradePpc>,
    pub top_variance_reasons: Vec<VarianceReasonCount>,
}

// ==========================================
// TradePpc - 分工种 PPC
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePpc {
    pub trade_id: String,
    pub committed: u32,
    pub completed: u32,
    pub ppc_percent: f64,
}

// ==========================================
// VarianceReasonCount - 未完成原因计数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReasonCount {
    pub reason: String,
    pub category: Option<VarianceCategory>,
    pub count: u32,
}

// ==========================================
// PpcSummary - 当前 PPC 与趋势
// ==========================================
// trend = 最新周 - 次新周; 不足两周时为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpcSummary {
    pub project_id: String,
    pub current: Option<f64>,
    pub previous: Option<f64>,
    pub trend: Option<f64>,
    pub average: Option<f64>,
    pub weeks_count: usize,
    pub latest_week_start: Option<NaiveDate>,
}

// ==========================================
// VarianceWeek - 周未完成统计 (按需从台账重算)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceWeek {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_committed: u32,
    pub not_completed: u32,
    pub with_reason: u32,
    pub by_category: BTreeMap<String, u32>, // 分类 → 次数, 未分类记为 "uncategorized"
}
