// ==========================================
// 节拍排程内核 - 作业进度 SQLite 仓储
// ==========================================
// 表: progress_record, 主键 (assignment_id, zone_id, trade_id)
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::progress::ProgressRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::ProgressRepository;

pub struct SqliteProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteProgressRepository {
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

impl ProgressRepository for SqliteProgressRepository {
    fn get(&self, assignment_id: &str, zone_id: &str, trade_id: &str) -> RepositoryResult<Option<ProgressRecord>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                r#"
                SELECT payload_json FROM progress_record
                WHERE assignment_id = ?1 AND zone_id = ?2 AND trade_id = ?3
                "#,
                params![assignment_id, zone_id, trade_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, record: &ProgressRecord) -> RepositoryResult<()> {
        let payload = serde_json::to_string(record)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO progress_record (assignment_id, zone_id, trade_id, payload_json)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(assignment_id, zone_id, trade_id) DO UPDATE SET
                payload_json = excluded.payload_json
            "#,
            params![record.assignment_id, record.zone_id, record.trade_id, payload],
        )?;
        Ok(())
    }

    fn list_by_assignment(&self, assignment_id: &str) -> RepositoryResult<Vec<ProgressRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT payload_json FROM progress_record
            WHERE assignment_id = ?1
            ORDER BY zone_id, trade_id
            "#,
        )?;
        let payloads = stmt
            .query_map(params![assignment_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|json| serde_json::from_str(json).map_err(RepositoryError::from))
            .collect()
    }

    fn delete_by_assignment(&self, assignment_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let removed = conn.execute(
            "DELETE FROM progress_record WHERE assignment_id = ?1",
            params![assignment_id],
        )?;
        Ok(removed)
    }
}
