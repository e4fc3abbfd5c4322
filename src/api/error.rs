// ==========================================
// 节拍排程内核 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型, 转换 Repository / Engine 错误
// 分类: 输入校验 / 资源不存在 / 无承诺 / 依赖环 / 存储 / 内部
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

use crate::engine::constraint::ConstraintError;
use crate::engine::dependency_graph::GraphError;
use crate::engine::flowline::FlowlineError;
use crate::engine::ppc::PpcError;
use crate::engine::progress::ProgressError;
use crate::repository::error::RepositoryError;

/// 对外错误: 每个变体对应一个命令层错误码
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入 / 业务规则 =====
    #[error("输入校验失败: {0}")]
    ValidationError(String),

    #[error("未找到: {0}")]
    NotFound(String),

    /// 该周没有任何计划承诺 (区别于 PPC 偏低)
    #[error("该周无计划承诺: project_id={project_id}, week_start={week_start}")]
    NoCommitments {
        project_id: String,
        week_start: NaiveDate,
    },

    /// 仅严格排序时返回
    #[error("依赖关系存在环: {nodes:?}")]
    CycleDetected { nodes: Vec<String> },

    // ===== 存储 =====
    #[error("存储访问失败: {0}")]
    DatabaseError(String),

    // ===== 其他 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => ApiError::InternalError(format!("锁获取失败: {}", msg)),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::SerializationError(msg) => {
                ApiError::InternalError(format!("序列化失败: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从引擎错误转换
// ==========================================
impl From<FlowlineError> for ApiError {
    fn from(err: FlowlineError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<ConstraintError> for ApiError {
    fn from(err: ConstraintError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::CycleDetected { nodes } => ApiError::CycleDetected { nodes },
            GraphError::DuplicateTradeCode(code) => {
                ApiError::ValidationError(format!("工种代码重复: {}", code))
            }
        }
    }
}

impl From<PpcError> for ApiError {
    fn from(err: PpcError) -> Self {
        match err {
            PpcError::NoCommitments {
                project_id,
                week_start,
            } => ApiError::NoCommitments {
                project_id,
                week_start,
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::not_found("FlowlineData", "plan-9").into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("FlowlineData"));
                assert!(msg.contains("plan-9"));
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::InternalError(_)));
    }

    #[test]
    fn test_engine_error_conversion() {
        let week = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let api_err: ApiError = PpcError::NoCommitments {
            project_id: "P1".to_string(),
            week_start: week,
        }
        .into();
        assert!(matches!(api_err, ApiError::NoCommitments { .. }));

        let api_err: ApiError = GraphError::CycleDetected {
            nodes: vec!["A".to_string(), "B".to_string()],
        }
        .into();
        match api_err {
            ApiError::CycleDetected { nodes } => assert_eq!(nodes, vec!["A", "B"]),
            other => panic!("Expected CycleDetected, got {:?}", other),
        }

        let api_err: ApiError = FlowlineError::NoZones.into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));
    }
}
