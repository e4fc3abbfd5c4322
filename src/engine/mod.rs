// ==========================================
// 节拍排程内核 - 引擎层
// ==========================================
// 职责: 纯计算 (关系库 / 依赖图 / 约束 / 流水线 / 缓冲 / PPC / 进度)
// 红线: 引擎不触碰存储, 不拼 SQL
// ==========================================

pub mod buffer;
pub mod catalog;
pub mod constraint;
pub mod dependency_graph;
pub mod flowline;
pub mod ppc;
pub mod progress;

// 重导出核心引擎
pub use buffer::BufferAnalyzer;
pub use catalog::RelationshipLibrary;
pub use constraint::{ConstraintChecker, ConstraintError};
pub use dependency_graph::{DependencyGraphEngine, GraphError};
pub use flowline::{FlowlineError, FlowlineGenerator};
pub use ppc::{PpcCalculator, PpcError};
pub use progress::{ProgressError, ProgressTracker};
