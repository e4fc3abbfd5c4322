// ==========================================
// 节拍排程内核 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口, 屏蔽存储细节
// 实现: 进程内 (默认) / SQLite
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod commitment_repo;
pub mod daily_log_repo;
pub mod error;
pub mod flowline_repo;
pub mod key_lock;
pub mod memory;
pub mod ppc_repo;
pub mod progress_repo;
pub mod traits;

// 重导出核心仓储
pub use commitment_repo::SqliteCommitmentRepository;
pub use daily_log_repo::SqliteDailyLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use flowline_repo::SqliteFlowlineRepository;
pub use key_lock::KeyedLock;
pub use memory::{
    MemoryCommitmentRepository, MemoryDailyLogRepository, MemoryFlowlineRepository,
    MemoryPpcRecordRepository, MemoryProgressRepository,
};
pub use ppc_repo::SqlitePpcRecordRepository;
pub use progress_repo::SqliteProgressRepository;
pub use traits::{
    CommitmentRepository, DailyLogRepository, FlowlineRepository, PpcRecordRepository,
    ProgressRepository,
};
