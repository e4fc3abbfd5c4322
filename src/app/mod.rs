// ==========================================
// 节拍排程内核 - 应用层
// ==========================================
// 职责: 组装共享状态, 暴露 JSON 命令入口
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use commands::{dispatch, ErrorResponse, COMMANDS};
pub use state::{get_default_db_path, AppState};
