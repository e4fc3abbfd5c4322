// ==========================================
// 节拍排程内核 - 计划参数
// ==========================================
// 默认值即无数据库覆写时的行为
// ==========================================

use serde::{Deserialize, Serialize};

/// 节拍 / 缓冲 / 作业天数上限的允许最大值 (保证流水线坐标不溢出 u32)
pub const PLANNING_LIMIT_CEILING: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub today_ratio: f64,             // today 游标占总周期比例
    pub max_commitment_batch: usize,  // 批量创建承诺上限
    pub variance_reason_limit: usize, // 未完成原因返回条数
    pub buffer_warning_ratio: f64,    // 缓冲消耗 > 此值 → warning
    pub buffer_critical_ratio: f64,   // 缓冲消耗 > 此值 → critical
    pub max_takt_time: u32,
    pub max_buffer_size: u32,
    pub max_duration_days: u32,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            today_ratio: 0.45,
            max_commitment_batch: 100,
            variance_reason_limit: 10,
            buffer_warning_ratio: 0.3,
            buffer_critical_ratio: 0.7,
            max_takt_time: 30,
            max_buffer_size: 30,
            max_duration_days: 30,
        }
    }
}

impl PlanningConfig {
    /// 参数一致性校验
    pub fn validate(&self) -> Result<(), String> {
        if !self.today_ratio.is_finite() || !(0.0..=1.0).contains(&self.today_ratio) {
            return Err(format!("today_ratio 必须在 [0, 1] 之间: {}", self.today_ratio));
        }
        if self.max_commitment_batch == 0 {
            return Err("max_commitment_batch 必须大于 0".to_string());
        }
        if self.variance_reason_limit == 0 {
            return Err("variance_reason_limit 必须大于 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.buffer_warning_ratio)
            || !(0.0..=1.0).contains(&self.buffer_critical_ratio)
        {
            return Err("缓冲阈值必须在 [0, 1] 之间".to_string());
        }
        if self.buffer_warning_ratio >= self.buffer_critical_ratio {
            return Err(format!(
                "buffer_warning_ratio ({}) 必须小于 buffer_critical_ratio ({})",
                self.buffer_warning_ratio, self.buffer_critical_ratio
            ));
        }
        if self.max_takt_time == 0 || self.max_duration_days == 0 {
            return Err("max_takt_time / max_duration_days 必须大于 0".to_string());
        }
        for (name, value) in [
            ("max_takt_time", self.max_takt_time),
            ("max_buffer_size", self.max_buffer_size),
            ("max_duration_days", self.max_duration_days),
        ] {
            if value > PLANNING_LIMIT_CEILING {
                return Err(format!("{} 不能超过 {}: {}", name, PLANNING_LIMIT_CEILING, value));
            }
        }
        Ok(())
    }
}
