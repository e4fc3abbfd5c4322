// ==========================================
// 节拍排程内核 - 周 PPC 记录 SQLite 仓储
// ==========================================
// 表: ppc_record, 主键 (project_id, week_start)
// 红线: 重算覆盖, 同一周只保留一条
// ==========================================

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ppc::PpcRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::PpcRecordRepository;

pub struct SqlitePpcRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePpcRecordRepository {
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

impl PpcRecordRepository for SqlitePpcRecordRepository {
    fn upsert(&self, record: &PpcRecord) -> RepositoryResult<()> {
        let payload = serde_json::to_string(record)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO ppc_record (project_id, week_start, payload_json)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(project_id, week_start) DO UPDATE SET
                payload_json = excluded.payload_json
            "#,
            params![record.project_id, record.week_start, payload],
        )?;
        Ok(())
    }

    fn find_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Option<PpcRecord>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM ppc_record WHERE project_id = ?1 AND week_start = ?2",
                params![project_id, week_start],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<PpcRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT payload_json FROM ppc_record WHERE project_id = ?1 ORDER BY week_start ASC",
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
