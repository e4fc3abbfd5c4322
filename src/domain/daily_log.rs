// ==========================================
// 节拍排程内核 - 施工日志领域模型
// ==========================================
// 键: (project_id, log_date)
// 同日二次提交: 仅合并非空字段 (upsert),不产生重复记录
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub project_id: String,
    pub log_date: NaiveDate,
    pub weather: Option<String>,
    pub temperature_c: Option<f64>,
    pub crew_count: Option<u32>,
    pub work_summary: Option<String>,
    pub delays: Option<String>,
    pub safety_incidents: Option<u32>,
    pub notes: Option<String>,
    pub submitted_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLogInput {
    pub project_id: String,
    pub log_date: NaiveDate,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub crew_count: Option<u32>,
    #[serde(default)]
    pub work_summary: Option<String>,
    #[serde(default)]
    pub delays: Option<String>,
    #[serde(default)]
    pub safety_incidents: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub submitted_by: Option<String>,
}

impl DailyLog {
    pub fn from_input(input: DailyLogInput, now: NaiveDateTime) -> Self {
        Self {
            project_id: input.project_id,
            log_date: input.log_date,
            weather: input.weather,
            temperature_c: input.temperature_c,
            crew_count: input.crew_count,
            work_summary: input.work_summary,
            delays: input.delays,
            safety_incidents: input.safety_incidents,
            notes: input.notes,
            submitted_by: input.submitted_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// 合并二次提交: 非空字段覆盖,空字段保留原值
    pub fn merge(&mut self, input: DailyLogInput, now: NaiveDateTime) {
        fn take<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }

        take(&mut self.weather, input.weather);
        take(&mut self.temperature_c, input.temperature_c);
        take(&mut self.crew_count, input.crew_count);
        take(&mut self.work_summary, input.work_summary);
        take(&mut self.delays, input.delays);
        take(&mut self.safety_incidents, input.safety_incidents);
        take(&mut self.notes, input.notes);
        take(&mut self.submitted_by, input.submitted_by);
        self.updated_at = now;
    }
}
