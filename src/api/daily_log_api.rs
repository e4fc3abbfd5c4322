// ==========================================
// 节拍排程内核 - 施工日志 API
// ==========================================
// 键: (project_id, log_date)
// 同日二次提交合并非空字段, 不产生重复记录
// ==========================================

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_non_empty, validate_daily_log};
use crate::domain::daily_log::{DailyLog, DailyLogInput};
use crate::repository::key_lock::daily_log_key;
use crate::repository::{DailyLogRepository, KeyedLock};

pub struct DailyLogApi {
    repo: Arc<dyn DailyLogRepository>,
    locks: Arc<KeyedLock>,
}

impl DailyLogApi {
    pub fn new(repo: Arc<dyn DailyLogRepository>, locks: Arc<KeyedLock>) -> Self {
        Self { repo, locks }
    }

    /// 提交施工日志 (upsert)
    pub fn submit(&self, input: DailyLogInput) -> ApiResult<DailyLog> {
        validate_daily_log(&input)?;

        let key = daily_log_key(&input.project_id, input.log_date);
        self.locks.with_key(&key, || -> ApiResult<DailyLog> {
            let now = Utc::now().naive_utc();
            let (log, merged) = match self.repo.get(&input.project_id, input.log_date)? {
                Some(mut existing) => {
                    existing.merge(input, now);
                    (existing, true)
                }
                None => (DailyLog::from_input(input, now), false),
            };
            self.repo.put(&log)?;

            info!(
                project_id = %log.project_id,
                log_date = %log.log_date,
                merged = merged,
                "施工日志已保存"
            );
            Ok(log)
        })
    }

    pub fn get(&self, project_id: &str, log_date: NaiveDate) -> ApiResult<DailyLog> {
        require_non_empty("project_id", project_id)?;
        self.repo.get(project_id, log_date)?.ok_or_else(|| {
            ApiError::NotFound(format!("施工日志(project_id={}, date={})不存在", project_id, log_date))
        })
    }

    /// 按日期升序
    pub fn list(&self, project_id: &str) -> ApiResult<Vec<DailyLog>> {
        require_non_empty("project_id", project_id)?;
        Ok(self.repo.list_by_project(project_id)?)
    }
}
