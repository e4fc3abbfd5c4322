// ==========================================
// 节拍排程内核 - 仓储层错误类型
// ==========================================
// 内存与 SQLite 两种实现共用同一错误集合
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 按键查找的实体不存在 (update 等需要既有记录的写操作)
    #[error("{entity}(id={id}) 不存在")]
    NotFound { entity: String, id: String },

    /// 连接或键锁已中毒
    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    /// 主键重复 (如重复的承诺 id)
    #[error("主键或唯一键冲突: {0}")]
    UniqueConstraintViolation(String),

    /// payload_json 或列值无法还原为领域对象
    #[error("存储内容无法解析: {0}")]
    SerializationError(String),

    #[error("仓储内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
                RepositoryError::UniqueConstraintViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            rusqlite::Error::FromSqlConversionFailure(col, _, cause) => {
                RepositoryError::SerializationError(format!("列 {}: {}", col, cause))
            }
            rusqlite::Error::InvalidColumnType(col, name, ty) => {
                RepositoryError::SerializationError(format!("列 {}({}) 类型为 {}", col, name, ty))
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_duplicate_primary_key_maps_to_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id TEXT PRIMARY KEY)", []).unwrap();
        conn.execute("INSERT INTO t (id) VALUES ('a')", []).unwrap();

        let err: RepositoryError = conn
            .execute("INSERT INTO t (id) VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_bad_payload_maps_to_serialization_error() {
        let err: RepositoryError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, RepositoryError::SerializationError(_)));

        let err = RepositoryError::not_found("PpcRecord", "p1:2026-03-02");
        assert_eq!(err.to_string(), "PpcRecord(id=p1:2026-03-02) 不存在");
    }
}
