// ==========================================
// 节拍排程内核 - 配置层
// ==========================================
// 职责: 计划参数默认值 + 数据库覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod planning_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use planning_config::{PlanningConfig, PLANNING_LIMIT_CEILING};
