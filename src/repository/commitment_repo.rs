// ==========================================
// 节拍排程内核 - 周承诺台账 SQLite 仓储
// ==========================================
// 表: weekly_commitment (列存储, rowid 保持创建顺序)
// 红线: Repository 不含业务逻辑
// ==========================================

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::commitment::WeeklyCommitment;
use crate::domain::types::VarianceCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::CommitmentRepository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, project_id, week_start, week_end, trade_id, zone_id, description,
           committed, completed, variance_reason, variance_category, created_at, updated_at
    FROM weekly_commitment
"#;

pub struct SqliteCommitmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCommitmentRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<WeeklyCommitment> {
        let category = row
            .get::<_, Option<String>>(10)?
            .map(|s| {
                s.parse::<VarianceCategory>()
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, e.into()))
            })
            .transpose()?;

        Ok(WeeklyCommitment {
            id: row.get(0)?,
            project_id: row.get(1)?,
            week_start: row.get(2)?,
            week_end: row.get(3)?,
            trade_id: row.get(4)?,
            zone_id: row.get(5)?,
            description: row.get(6)?,
            committed: row.get(7)?,
            completed: row.get(8)?,
            variance_reason: row.get(9)?,
            variance_category: category,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

impl CommitmentRepository for SqliteCommitmentRepository {
    /// 批量插入 (单事务, 任一失败整体回滚)
    fn insert_batch(&self, items: &[WeeklyCommitment]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO weekly_commitment (
                    id, project_id, week_start, week_end, trade_id, zone_id, description,
                    committed, completed, variance_reason, variance_category, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )?;
            for c in items {
                stmt.execute(params![
                    c.id,
                    c.project_id,
                    c.week_start,
                    c.week_end,
                    c.trade_id,
                    c.zone_id,
                    c.description,
                    c.committed,
                    c.completed,
                    c.variance_reason,
                    c.variance_category.map(|v| v.as_str()),
                    c.created_at,
                    c.updated_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(items.len())
    }

    fn find_by_id(&self, id: &str) -> RepositoryResult<Option<WeeklyCommitment>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], Self::map_row).optional()?)
    }

    fn update(&self, item: &WeeklyCommitment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE weekly_commitment
            SET completed = ?2, variance_reason = ?3, variance_category = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
            params![
                item.id,
                item.completed,
                item.variance_reason,
                item.variance_category.map(|v| v.as_str()),
                item.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("WeeklyCommitment", &item.id));
        }
        Ok(())
    }

    fn list_by_project(&self, project_id: &str) -> RepositoryResult<Vec<WeeklyCommitment>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE project_id = ?1 ORDER BY rowid", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id], Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_by_week(&self, project_id: &str, week_start: NaiveDate) -> RepositoryResult<Vec<WeeklyCommitment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE project_id = ?1 AND week_start = ?2 ORDER BY rowid",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![project_id, week_start], Self::map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
