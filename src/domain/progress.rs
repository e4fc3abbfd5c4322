// ==========================================
// 节拍排程内核 - 作业进度领域模型
// ==========================================
// 键: (assignment_id, zone_id, trade_id)
// 红线: 始终保留上一次进度以便做增量分析
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::ProgressStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub assignment_id: String,
    pub zone_id: String,
    pub trade_id: String,
    pub percent_complete: f64,
    pub previous_percent: f64,
    pub status: ProgressStatus,
    pub note: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl ProgressRecord {
    /// 首次上报前的初始状态
    pub fn not_started(
        assignment_id: impl Into<String>,
        zone_id: impl Into<String>,
        trade_id: impl Into<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            assignment_id: assignment_id.into(),
            zone_id: zone_id.into(),
            trade_id: trade_id.into(),
            percent_complete: 0.0,
            previous_percent: 0.0,
            status: ProgressStatus::NotStarted,
            note: None,
            updated_at: now,
        }
    }

    pub fn delta(&self) -> f64 {
        self.percent_complete - self.previous_percent
    }
}

// ==========================================
// ProgressUpdate - 进度上报请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub assignment_id: String,
    pub zone_id: String,
    pub trade_id: String,
    pub percent_complete: f64,
    #[serde(default)]
    pub status: Option<ProgressStatus>, // 显式状态 (如 delayed)
    #[serde(default)]
    pub note: Option<String>,
}
