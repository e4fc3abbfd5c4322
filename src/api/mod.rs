// ==========================================
// 节拍排程内核 - API 层
// ==========================================
// 职责: 输入校验 + 调用引擎 + 读写仓储
// 红线: 所有写操作完整校验后才写入
// ==========================================

pub mod commitment_api;
pub mod daily_log_api;
pub mod error;
pub mod flowline_api;
pub mod planning_api;
pub mod ppc_api;
pub mod validator;

// 重导出
pub use commitment_api::CommitmentApi;
pub use daily_log_api::DailyLogApi;
pub use error::{ApiError, ApiResult};
pub use flowline_api::{FlowlineApi, GenerateFlowlineRequest};
pub use planning_api::{
    CatalogOverview, CycleReport, EarliestScheduleRequest, FeasibilityRequest, PlanningApi, SequenceRequest,
    SequenceResponse,
};
pub use ppc_api::PpcApi;
