// ==========================================
// 节拍排程内核 - 周承诺台账 API
// ==========================================
// 职责: 创建 / 批量创建 / 补丁 / 查询
// 红线: 批量 1..=上限, 超限整体拒绝, 不截断
// 红线: 整批校验通过后才写入, 写入原子
// 红线: 补丁只触碰 completed / variance_reason / variance_category
// ==========================================

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{require_non_empty, validate_commitment_batch, validate_patch};
use crate::domain::commitment::{CommitmentPatch, NewCommitment, WeeklyCommitment};
use crate::repository::key_lock::week_key;
use crate::repository::{CommitmentRepository, KeyedLock};

pub struct CommitmentApi {
    repo: Arc<dyn CommitmentRepository>,
    locks: Arc<KeyedLock>,
    max_batch: usize,
}

impl CommitmentApi {
    pub fn new(repo: Arc<dyn CommitmentRepository>, locks: Arc<KeyedLock>, max_batch: usize) -> Self {
        Self {
            repo,
            locks,
            max_batch,
        }
    }

    /// 创建单条承诺
    pub fn create(&self, input: NewCommitment) -> ApiResult<WeeklyCommitment> {
        let mut created = self.bulk_create(vec![input])?;
        created
            .pop()
            .ok_or_else(|| ApiError::InternalError("创建结果为空".to_string()))
    }

    /// 批量创建承诺
    ///
    /// # 参数
    /// - `items`: 1..=max_batch 条
    ///
    /// # 返回
    /// - Ok(Vec<WeeklyCommitment>): 按输入顺序返回已创建条目
    /// - Err(ValidationError): 任一校验失败, 不写入任何条目
    pub fn bulk_create(&self, items: Vec<NewCommitment>) -> ApiResult<Vec<WeeklyCommitment>> {
        if let Err(e) = validate_commitment_batch(&items, self.max_batch) {
            warn!(count = items.len(), max_batch = self.max_batch, error = %e, "批量创建承诺被拒绝");
            return Err(e);
        }

        let now = Utc::now().naive_utc();
        let created: Vec<WeeklyCommitment> = items
            .into_iter()
            .map(|input| WeeklyCommitment::from_new(input, now))
            .collect();

        self.repo.insert_batch(&created)?;

        info!(count = created.len(), "周承诺已创建");
        Ok(created)
    }

    /// 修改承诺的可变字段
    ///
    /// 与该 (project, week) 的 PPC 计算互斥
    pub fn patch(&self, id: &str, patch: CommitmentPatch) -> ApiResult<WeeklyCommitment> {
        require_non_empty("commitment_id", id)?;
        validate_patch(&patch)?;

        let existing = self
            .repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("周承诺(id={})不存在", id)))?;

        let key = week_key(&existing.project_id, existing.week_start);
        self.locks.with_key(&key, || -> ApiResult<WeeklyCommitment> {
            // 进入独占区后重新读取
            let mut current = self
                .repo
                .find_by_id(id)?
                .ok_or_else(|| ApiError::NotFound(format!("周承诺(id={})不存在", id)))?;
            current.apply_patch(&patch, Utc::now().naive_utc());
            self.repo.update(&current)?;

            info!(
                commitment_id = %id,
                completed = current.completed,
                has_variance = current.has_variance(),
                "周承诺已更新"
            );
            Ok(current)
        })
    }

    pub fn get(&self, id: &str) -> ApiResult<WeeklyCommitment> {
        require_non_empty("commitment_id", id)?;
        self.repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("周承诺(id={})不存在", id)))
    }

    pub fn list_by_project(&self, project_id: &str) -> ApiResult<Vec<WeeklyCommitment>> {
        require_non_empty("project_id", project_id)?;
        Ok(self.repo.list_by_project(project_id)?)
    }

    pub fn list_by_week(&self, project_id: &str, week_start: NaiveDate) -> ApiResult<Vec<WeeklyCommitment>> {
        require_non_empty("project_id", project_id)?;
        Ok(self.repo.list_by_week(project_id, week_start)?)
    }
}
