// ==========================================
// 节拍排程内核 - 核心库
// ==========================================
// 范围: 工序关系库 / 依赖排序 / 流水线 / 缓冲 / 周承诺 / PPC
// 技术栈: Rust + SQLite (可选, 默认进程内存储)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 纯计算
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与 JSON 命令
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BufferStatus, Discipline, ProgressStatus, ProjectType, RelationshipType, SegmentStatus,
    VarianceCategory,
};

// 领域实体
pub use domain::{
    ActivityRelationshipTemplate, ActivityWindow, BufferEntry, DailyLog, FlowlineData, PpcRecord,
    ProgressRecord, Segment, Trade, Wagon, WeeklyCommitment, Zone,
};

// 引擎
pub use engine::{
    BufferAnalyzer, ConstraintChecker, DependencyGraphEngine, FlowlineGenerator, PpcCalculator,
    ProgressTracker, RelationshipLibrary,
};

// API
pub use api::{ApiError, CommitmentApi, DailyLogApi, FlowlineApi, PlanningApi, PpcApi};

// 应用
pub use app::{dispatch, AppState};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "节拍排程内核";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
