// ==========================================
// 节拍排程内核 - 进程内仓储实现
// ==========================================
// 默认存储: 进程生命周期内有效, 无 TTL, 无自动淘汰
// ==========================================

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::domain::commitment::WeeklyCommitment;
use crate::domain::daily_log::DailyLog;
use crate::domain::plan::FlowlineData;
use crate::domain::ppc::PpcRecord;
use crate::domain::progress::ProgressRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{
    CommitmentRepository, DailyLogRepository, FlowlineRepository, PpcRecordRepository,
    ProgressRepository,
};

fn lock<T>(m: &Mutex<T>) -> RepositoryResult<MutexGuard<'_, T>> {
    m.lock().map_err(|e| RepositoryError::LockError(e.to_string()))
}

// ==========================================
// 流水线
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryFlowlineRepository {
    plans: Mutex<HashMap<String, FlowlineData>>,
}

impl MemoryFlowlineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowlineRepository for MemoryFlowlineRepository {
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<FlowlineData>> {
        Ok(lock(&self.plans)?.get(plan_id).cloned())
    }

    fn put(&self, flowline: &FlowlineData) -> RepositoryResult<()> {
        lock(&self.plans)?.insert(flowline.plan_id.clone(), flowline.clone());
        Ok(())
    }

    fn delete(&self, plan_id: &str) -> RepositoryResult<bool> {
        Ok(lock(&self.plans)?.remove(plan_id).is_some())
    }
}

// ==========================================
// 周承诺台账
// ==========================================
// Vec 保持插入顺序
#[derive(Debug, Default)]
pub struct MemoryCommitmentRepository {
    items: Mutex<Vec<WeeklyCommitment>>,
}

impl MemoryCommitmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitmentRepository for MemoryCommitmentRepository {
    fn insert_batch(&self, batch: &[WeeklyCommitment]) -> RepositoryResult<usize> {
        let mut items = lock(&self.items)?;
        if let Some(dup) = batch.iter().find(|b| items.iter().any(|c| c.id == b.id)) {
            return Err(RepositoryError::UniqueConstraintViolation(format!(
                "weekly_commitment.id={}",
                dup.id
            )));
        }
        items.extend_from_slice(batch);
        Ok(batch.len())
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<WeeklyCommitment>> {
        Ok(lock(&self.items)?.iter().find(|c| c.id == id).cloned())
    }

    fn update(&self, item: &WeeklyCommitment) -> RepositoryResult<()> {
        let mut items = lock(&self.items)?;
        match items.iter_mut().find(|c| c.id == item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found("WeeklyCommitment", &item.id)),
        }
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<WeeklyCommitment>> {
        Ok(lock(&self.items)?
            .iter()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect())
    }

    fn list_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Vec<WeeklyCommitment>> {
        Ok(lock(&self.items)?
            .iter()
            .filter(|c| c.project_id == project_id && c.week_start == week_start)
            .cloned()
            .collect())
    }
}

// ==========================================
// 周 PPC 记录
// ==========================================
// BTreeMap 键 (project, week) 天然按周升序
#[derive(Debug, Default)]
pub struct MemoryPpcRecordRepository {
    records: Mutex<BTreeMap<(String, NaiveDate), PpcRecord>>,
}

impl MemoryPpcRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PpcRecordRepository for MemoryPpcRecordRepository {
    fn upsert(&self, record: &PpcRecord) -> RepositoryResult<()> {
        lock(&self.records)?.insert((record.project_id.clone(), record.week_start), record.clone());
        Ok(())
    }

    fn find_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Option<PpcRecord>> {
        Ok(lock(&self.records)?
            .get(&(project_id.to_string(), week_start))
            .cloned())
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<PpcRecord>> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|((p, _), _)| p == project_id)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

// ==========================================
// 作业进度
// ==========================================
type ProgressKey = (String, String, String);

#[derive(Debug, Default)]
pub struct MemoryProgressRepository {
    records: Mutex<BTreeMap<ProgressKey, ProgressRecord>>,
}

impl MemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressRepository for MemoryProgressRepository {
    fn get(&self, assignment_id: &str, zone_id: &str, trade_id: &str) -> RepositoryResult<Option<ProgressRecord>> {
        let key = (assignment_id.to_string(), zone_id.to_string(), trade_id.to_string());
        Ok(lock(&self.records)?.get(&key).cloned())
    }

    fn put(&self, record: &ProgressRecord) -> RepositoryResult<()> {
        let key = (
            record.assignment_id.clone(),
            record.zone_id.clone(),
            record.trade_id.clone(),
        );
        lock(&self.records)?.insert(key, record.clone());
        Ok(())
    }

    fn list_by_assignment(&self, assignment_id: &str) -> RepositoryResult<Vec<ProgressRecord>> {
        Ok(lock(&self.records)?
            .values()
            .filter(|r| r.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    fn delete_by_assignment(&self, assignment_id: &str) -> RepositoryResult<usize> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|(a, _, _), _| a != assignment_id);
        Ok(before - records.len())
    }
}

// ==========================================
// 施工日志
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryDailyLogRepository {
    logs: Mutex<BTreeMap<(String, NaiveDate), DailyLog>>,
}

impl MemoryDailyLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DailyLogRepository for MemoryDailyLogRepository {
    fn get(&self, project_id: &str, log_date: NaiveDate) -> RepositoryResult<Option<DailyLog>> {
        Ok(lock(&self.logs)?.get(&(project_id.to_string(), log_date)).cloned())
    }

    fn put(&self, log: &DailyLog) -> RepositoryResult<()> {
        lock(&self.logs)?.insert((log.project_id.clone(), log.log_date), log.clone());
        Ok(())
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<DailyLog>> {
        Ok(lock(&self.logs)?
            .iter()
            .filter(|((p, _), _)| p == project_id)
            .map(|(_, l)| l.clone())
            .collect())
    }
}
