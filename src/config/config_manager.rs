// ==========================================
// 节拍排程内核 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

use crate::config::planning_config::PlanningConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA (幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置快照 (键有序)
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取单项覆写; 格式错误时告警并保留默认值
    fn override_or<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(config_key = key, raw_value = %raw, default = %default, "配置格式错误, 使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 加载计划参数 (默认值 + config_kv 覆写)
    ///
    /// # 返回
    /// - Ok(PlanningConfig): 校验通过的参数
    /// - Err(InternalError): 覆写后参数不一致
    pub fn load_planning_config(&self) -> RepositoryResult<PlanningConfig> {
        let d = PlanningConfig::default();
        let config = PlanningConfig {
            today_ratio: self.override_or(config_keys::TODAY_RATIO, d.today_ratio)?,
            max_commitment_batch: self.override_or(config_keys::MAX_COMMITMENT_BATCH, d.max_commitment_batch)?,
            variance_reason_limit: self.override_or(config_keys::VARIANCE_REASON_LIMIT, d.variance_reason_limit)?,
            buffer_warning_ratio: self.override_or(config_keys::BUFFER_WARNING_RATIO, d.buffer_warning_ratio)?,
            buffer_critical_ratio: self.override_or(config_keys::BUFFER_CRITICAL_RATIO, d.buffer_critical_ratio)?,
            max_takt_time: self.override_or(config_keys::MAX_TAKT_TIME, d.max_takt_time)?,
            max_buffer_size: self.override_or(config_keys::MAX_BUFFER_SIZE, d.max_buffer_size)?,
            max_duration_days: self.override_or(config_keys::MAX_DURATION_DAYS, d.max_duration_days)?,
        };

        config.validate().map_err(RepositoryError::InternalError)?;

        info!(
            today_ratio = config.today_ratio,
            max_commitment_batch = config.max_commitment_batch,
            variance_reason_limit = config.variance_reason_limit,
            "计划参数加载完成"
        );
        Ok(config)
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 流水线
    pub const TODAY_RATIO: &str = "today_ratio";
    pub const MAX_TAKT_TIME: &str = "max_takt_time";
    pub const MAX_BUFFER_SIZE: &str = "max_buffer_size";
    pub const MAX_DURATION_DAYS: &str = "max_duration_days";

    // 缓冲健康度
    pub const BUFFER_WARNING_RATIO: &str = "buffer_warning_ratio";
    pub const BUFFER_CRITICAL_RATIO: &str = "buffer_critical_ratio";

    // 周承诺 / PPC
    pub const MAX_COMMITMENT_BATCH: &str = "max_commitment_batch";
    pub const VARIANCE_REASON_LIMIT: &str = "variance_reason_limit";
}
