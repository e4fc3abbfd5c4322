// ==========================================
// 节拍排程内核 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// - 建表幂等 (CREATE TABLE IF NOT EXISTS)
// ==========================================

use rusqlite::{Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout (毫秒)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前 schema 版本
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS flowline (
    plan_id       TEXT PRIMARY KEY,
    payload_json  TEXT NOT NULL,
    updated_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS weekly_commitment (
    id                 TEXT PRIMARY KEY,
    project_id         TEXT NOT NULL,
    week_start         TEXT NOT NULL,
    week_end           TEXT NOT NULL,
    trade_id           TEXT NOT NULL,
    zone_id            TEXT NOT NULL,
    description        TEXT NOT NULL,
    committed          INTEGER NOT NULL,
    completed          INTEGER NOT NULL,
    variance_reason    TEXT,
    variance_category  TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_commitment_project_week
    ON weekly_commitment (project_id, week_start);

CREATE TABLE IF NOT EXISTS ppc_record (
    project_id    TEXT NOT NULL,
    week_start    TEXT NOT NULL,
    payload_json  TEXT NOT NULL,
    PRIMARY KEY (project_id, week_start)
);

CREATE TABLE IF NOT EXISTS progress_record (
    assignment_id  TEXT NOT NULL,
    zone_id        TEXT NOT NULL,
    trade_id       TEXT NOT NULL,
    payload_json   TEXT NOT NULL,
    PRIMARY KEY (assignment_id, zone_id, trade_id)
);

CREATE TABLE IF NOT EXISTS daily_log (
    project_id    TEXT NOT NULL,
    log_date      TEXT NOT NULL,
    payload_json  TEXT NOT NULL,
    PRIMARY KEY (project_id, log_date)
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys / busy_timeout 需要每个连接单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version (若表不存在则返回 None)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
