// ==========================================
// 节拍排程内核 - 应用状态
// ==========================================
// 职责: 组装仓储 / 引擎 / API, 持有共享锁与配置
// 存储: memory (默认) 或 sqlite, 由环境变量选择
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CommitmentApi, DailyLogApi, FlowlineApi, PlanningApi, PpcApi};
use crate::config::{ConfigManager, PlanningConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{BufferAnalyzer, FlowlineGenerator, PpcCalculator};
use crate::repository::{
    CommitmentRepository, DailyLogRepository, FlowlineRepository, KeyedLock,
    MemoryCommitmentRepository, MemoryDailyLogRepository, MemoryFlowlineRepository,
    MemoryPpcRecordRepository, MemoryProgressRepository, PpcRecordRepository, ProgressRepository,
    SqliteCommitmentRepository, SqliteDailyLogRepository, SqliteFlowlineRepository,
    SqlitePpcRecordRepository, SqliteProgressRepository,
};

/// 存储后端选择
pub const STORAGE_ENV: &str = "TAKT_PLANNER_STORAGE";
/// SQLite 路径
pub const DB_PATH_ENV: &str = "TAKT_PLANNER_DB_PATH";

/// 仓储集合 (组装期使用)
struct Repositories {
    flowline: Arc<dyn FlowlineRepository>,
    commitment: Arc<dyn CommitmentRepository>,
    ppc: Arc<dyn PpcRecordRepository>,
    progress: Arc<dyn ProgressRepository>,
    daily_log: Arc<dyn DailyLogRepository>,
}

/// 应用状态
///
/// 所有 API 共享同一把 KeyedLock, 保证跨 API 的同键互斥
/// (如承诺补丁与同周 PPC 计算)
pub struct AppState {
    /// 数据库路径 (内存模式为 None)
    pub db_path: Option<String>,

    /// 生效配置
    pub config: PlanningConfig,

    pub locks: Arc<KeyedLock>,

    pub planning_api: Arc<PlanningApi>,
    pub flowline_api: Arc<FlowlineApi>,
    pub commitment_api: Arc<CommitmentApi>,
    pub ppc_api: Arc<PpcApi>,
    pub daily_log_api: Arc<DailyLogApi>,
}

impl AppState {
    /// 内存存储 + 默认配置
    pub fn in_memory() -> Self {
        Self::in_memory_with_config(PlanningConfig::default())
    }

    pub fn in_memory_with_config(config: PlanningConfig) -> Self {
        tracing::info!("初始化AppState (内存存储)");
        let repos = Repositories {
            flowline: Arc::new(MemoryFlowlineRepository::new()),
            commitment: Arc::new(MemoryCommitmentRepository::new()),
            ppc: Arc::new(MemoryPpcRecordRepository::new()),
            progress: Arc::new(MemoryProgressRepository::new()),
            daily_log: Arc::new(MemoryDailyLogRepository::new()),
        };
        Self::assemble(None, config, repos)
    }

    /// SQLite 存储
    ///
    /// # 参数
    /// - `db_path`: 数据库文件路径, 不存在时创建
    ///
    /// # 返回
    /// - Err(String): 打开 / 建表 / 读取配置失败
    pub fn with_sqlite(db_path: &str) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = ConfigManager::from_connection(conn.clone())
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        let config = config_manager
            .load_planning_config()
            .map_err(|e| format!("配置加载失败: {}", e))?;

        let repos = Repositories {
            flowline: Arc::new(SqliteFlowlineRepository::from_connection(conn.clone())),
            commitment: Arc::new(SqliteCommitmentRepository::from_connection(conn.clone())),
            ppc: Arc::new(SqlitePpcRecordRepository::from_connection(conn.clone())),
            progress: Arc::new(SqliteProgressRepository::from_connection(conn.clone())),
            daily_log: Arc::new(SqliteDailyLogRepository::from_connection(conn)),
        };
        Ok(Self::assemble(Some(db_path.to_string()), config, repos))
    }

    /// 按环境变量选择存储后端
    ///
    /// - `TAKT_PLANNER_STORAGE=memory` (默认) / `sqlite`
    /// - sqlite 时路径取 `TAKT_PLANNER_DB_PATH`, 否则用户数据目录
    pub fn from_env() -> Result<Self, String> {
        let storage = std::env::var(STORAGE_ENV).unwrap_or_default();
        match storage.trim().to_ascii_lowercase().as_str() {
            "" | "memory" => Ok(Self::in_memory()),
            "sqlite" => Self::with_sqlite(&get_default_db_path()),
            other => Err(format!("未知存储后端: {} (可选 memory / sqlite)", other)),
        }
    }

    fn assemble(db_path: Option<String>, config: PlanningConfig, repos: Repositories) -> Self {
        let locks = Arc::new(KeyedLock::new());

        let flowline_api = Arc::new(FlowlineApi::new(
            repos.flowline,
            repos.progress,
            locks.clone(),
            FlowlineGenerator::from_config(&config),
            BufferAnalyzer::from_config(&config),
        ));
        let commitment_api = Arc::new(CommitmentApi::new(
            repos.commitment.clone(),
            locks.clone(),
            config.max_commitment_batch,
        ));
        let ppc_api = Arc::new(PpcApi::new(
            repos.commitment,
            repos.ppc,
            locks.clone(),
            PpcCalculator::from_config(&config),
        ));
        let daily_log_api = Arc::new(DailyLogApi::new(repos.daily_log, locks.clone()));

        tracing::info!("AppState初始化完成");

        Self {
            db_path,
            config,
            locks,
            planning_api: Arc::new(PlanningApi::new()),
            flowline_api,
            commitment_api,
            ppc_api,
            daily_log_api,
        }
    }
}

/// 默认数据库路径
///
/// 优先 `TAKT_PLANNER_DB_PATH`, 其次用户数据目录, 最后当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./takt_planner.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("takt-planner");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("无法创建数据目录 {}: {}", dir.display(), e);
        } else {
            path = dir.join("takt_planner.db");
        }
    }

    path.to_string_lossy().to_string()
}
