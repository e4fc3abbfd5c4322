// ==========================================
// 节拍排程内核 - 流水线 SQLite 仓储
// ==========================================
// 表: flowline (plan_id → payload_json)
// 重新生成时整体替换
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::plan::FlowlineData;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::FlowlineRepository;

pub struct SqliteFlowlineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFlowlineRepository {
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

impl FlowlineRepository for SqliteFlowlineRepository {
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<FlowlineData>> {
        let conn = self.get_conn()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM flowline WHERE plan_id = ?1",
                params![plan_id],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, flowline: &FlowlineData) -> RepositoryResult<()> {
        let payload = serde_json::to_string(flowline)?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO flowline (plan_id, payload_json, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(plan_id) DO UPDATE SET
                payload_json = excluded.payload_json,
                updated_at = excluded.updated_at
            "#,
            params![flowline.plan_id, payload],
        )?;
        Ok(())
    }

    fn delete(&self, plan_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let removed = conn.execute("DELETE FROM flowline WHERE plan_id = ?1", params![plan_id])?;
        Ok(removed > 0)
    }
}
