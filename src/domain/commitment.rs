// ==========================================
// 节拍排程内核 - 周计划承诺领域模型
// ==========================================
// 红线: 创建后仅 completed / variance_reason / variance_category 可修改
// 其余字段为不可变历史
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::types::VarianceCategory;

// ==========================================
// WeeklyCommitment - 周承诺条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCommitment {
    pub id: String,
    pub project_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub trade_id: String,
    pub zone_id: String,
    pub description: String,
    pub committed: bool,
    pub completed: bool,
    pub variance_reason: Option<String>,
    pub variance_category: Option<VarianceCategory>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WeeklyCommitment {
    /// 由创建请求生成承诺 (分配ID与时间戳)
    pub fn from_new(input: NewCommitment, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: input.project_id,
            week_start: input.week_start,
            week_end: input.week_end,
            trade_id: input.trade_id,
            zone_id: input.zone_id,
            description: input.description,
            committed: input.committed,
            completed: input.completed,
            variance_reason: input.variance_reason,
            variance_category: input.variance_category,
            created_at: now,
            updated_at: now,
        }
    }

    /// 应用补丁 (只触碰可变字段)
    pub fn apply_patch(&mut self, patch: &CommitmentPatch, now: NaiveDateTime) {
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(reason) = &patch.variance_reason {
            self.variance_reason = reason.clone();
        }
        if let Some(category) = patch.variance_category {
            self.variance_category = category;
        }
        self.updated_at = now;
    }

    /// 是否计入原因分析: 未完成且填写了原因
    pub fn has_variance(&self) -> bool {
        !self.completed && self.variance_reason.is_some()
    }
}

// ==========================================
// NewCommitment - 创建请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommitment {
    pub project_id: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub trade_id: String,
    pub zone_id: String,
    pub description: String,
    #[serde(default = "default_committed")]
    pub committed: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub variance_reason: Option<String>,
    #[serde(default)]
    pub variance_category: Option<VarianceCategory>,
}

fn default_committed() -> bool {
    true
}

// ==========================================
// CommitmentPatch - 承诺更新补丁
// ==========================================
// 未知字段拒绝,防止客户端误以为可以修改不可变字段
// 原因字段三态: 缺省 = 不改, null = 清空, 值 = 覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitmentPatch {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub variance_reason: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub variance_category: Option<Option<VarianceCategory>>,
}

// 字段出现即为 Some, 其中 null 为 Some(None)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CommitmentPatch {
    pub fn is_empty(&self) -> bool {
        self.completed.is_none() && self.variance_reason.is_none() && self.variance_category.is_none()
    }
}
