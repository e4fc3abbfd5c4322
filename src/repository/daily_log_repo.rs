// ==========================================
// 节拍排程内核 - 施工日志 SQLite 仓储
// ==========================================
// 表: daily_log, 主键 (project_id, log_date)
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::daily_log::DailyLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::DailyLogRepository;

pub struct SqliteDailyLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDailyLogRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl DailyLogRepository for SqliteDailyLogRepository {
    fn get(&self, project_id: &str, log_date: NaiveDate) -> RepositoryResult<Option<DailyLog>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM daily_log WHERE project_id = ?1 AND log_date = ?2",
                params![project_id, log_date],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, log: &DailyLog) -> RepositoryResult<()> {
        let payload = serde_json::to_string(log)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO daily_log (project_id, log_date, payload_json)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(project_id, log_date) DO UPDATE SET
                payload_json = excluded.payload_json
            "#,
            params![log.project_id, log.log_date, payload],
        )?;
        Ok(())
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<DailyLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT payload_json FROM daily_log WHERE project_id = ?1 ORDER BY log_date ASC",
        )?;
        let payloads = stmt
            .query_map(params![project_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).map_err(RepositoryError::from))
            .collect()
    }
}
