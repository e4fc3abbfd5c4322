// ==========================================
// 节拍排程内核 - 仓储接口
// ==========================================
// 职责: 定义数据访问接口 (get / put / delete 契约)
// 实现者: memory::* (进程内), *_repo::Sqlite* (rusqlite)
// 红线: Repository 不含业务规则, 只做数据 CRUD
// ==========================================

use chrono::NaiveDate;

use crate::domain::commitment::WeeklyCommitment;
use crate::domain::daily_log::DailyLog;
use crate::domain::plan::FlowlineData;
use crate::domain::ppc::PpcRecord;
use crate::domain::progress::ProgressRecord;
use crate::repository::error::RepositoryResult;

// ==========================================
// FlowlineRepository - 流水线存储
// ==========================================
// 键: plan_id; 重新生成时整体替换
pub trait FlowlineRepository: Send + Sync {
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<FlowlineData>>;

    fn put(&self, flowline: &FlowlineData) -> RepositoryResult<()>;

    /// 删除流水线
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 原本不存在
    fn delete(&self, plan_id: &str) -> RepositoryResult<bool>;
}

// ==========================================
// CommitmentRepository - 周承诺台账
// ==========================================
pub trait CommitmentRepository: Send + Sync {
    /// 批量插入 (原子: 全部成功或全部不写)
    fn insert_batch(&self, items: &[WeeklyCommitment]) -> RepositoryResult<usize>;

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<WeeklyCommitment>>;

    /// 覆盖已有条目, 不存在时返回 NotFound
    fn update(&self, item: &WeeklyCommitment) -> RepositoryResult<()>;

    /// 按创建顺序返回
    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<WeeklyCommitment>>;

    fn list_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Vec<WeeklyCommitment>>;
}

// ==========================================
// PpcRecordRepository - 周 PPC 记录
// ==========================================
// 键: (project_id, week_start)
pub trait PpcRecordRepository: Send + Sync {
    fn upsert(&self, record: &PpcRecord) -> RepositoryResult<()>;

    fn find_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Option<PpcRecord>>;

    /// 按 week_start 升序返回
    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<PpcRecord>>;
}

// ==========================================
// ProgressRepository - 作业进度
// ==========================================
// 键: (assignment_id, zone_id, trade_id)
pub trait ProgressRepository: Send + Sync {
    fn get(&self, assignment_id: &str, zone_id: &str, trade_id: &str) -> RepositoryResult<Option<ProgressRecord>>;

    fn put(&self, record: &ProgressRecord) -> RepositoryResult<()>;

    fn list_by_assignment(&self, assignment_id: &str) -> RepositoryResult<Vec<ProgressRecord>>;

    /// 清除作业下全部进度, 返回删除条数
    fn delete_by_assignment(&self, assignment_id: &str) -> RepositoryResult<usize>;
}

// ==========================================
// DailyLogRepository - 施工日志
// ==========================================
// 键: (project_id, log_date)
pub trait DailyLogRepository: Send + Sync {
    fn get(&self, project_id: &str, log_date: NaiveDate) -> RepositoryResult<Option<DailyLog>>;

    fn put(&self, log: &DailyLog) -> RepositoryResult<()>;

    /// 按 log_date 升序返回
    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<DailyLog>>;
}
