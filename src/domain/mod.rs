// ==========================================
// 节拍排程内核 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod commitment;
pub mod daily_log;
pub mod plan;
pub mod ppc;
pub mod progress;
pub mod relationship;
pub mod types;

// 重导出核心类型
pub use commitment::{CommitmentPatch, NewCommitment, WeeklyCommitment};
pub use daily_log::{DailyLog, DailyLogInput};
pub use plan::{
    BufferEntry, FlowlineData, FlowlineSummary, Segment, StackingConflict, Trade, Wagon, Zone,
};
pub use ppc::{PpcRecord, PpcSummary, TradePpc, VarianceReasonCount, VarianceWeek};
pub use progress::{ProgressRecord, ProgressUpdate};
pub use relationship::{
    ActivityRelationshipTemplate, ActivityWindow, ConstraintViolation, FeasibilityReport,
};
pub use types::{
    BufferStatus, Discipline, ProgressStatus, ProjectType, RelationshipType, SegmentStatus,
    VarianceCategory,
};
