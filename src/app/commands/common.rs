use crate::api::error::ApiError;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ==========================================
// 公共工具：错误映射、日期解析、载荷解析
// ==========================================

/// 内部故障对外统一提示, 细节只进日志
pub(crate) const GENERIC_INTERNAL_MESSAGE: &str = "内部错误，请查看服务日志";

/// 错误响应（返回给调用方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub(crate) fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

/// 将ApiError转换为JSON字符串
pub(crate) fn map_api_error(err: ApiError) -> String {
    let code = match &err {
        ApiError::ValidationError(_) => "VALIDATION_ERROR",
        ApiError::NotFound(_) => "NOT_FOUND",
        ApiError::NoCommitments { .. } => "NO_COMMITMENTS",
        ApiError::CycleDetected { .. } => "CYCLE_DETECTED",
        ApiError::DatabaseError(_) => "DATABASE_ERROR",
        ApiError::InternalError(_) => "INTERNAL_ERROR",
        ApiError::Other(_) => "OTHER_ERROR",
    };

    let message = match &err {
        ApiError::DatabaseError(_) | ApiError::InternalError(_) | ApiError::Other(_) => {
            tracing::error!(code = code, error = %err, "命令执行出现内部故障");
            GENERIC_INTERNAL_MESSAGE.to_string()
        }
        _ => err.to_string(),
    };

    let details = match &err {
        ApiError::NoCommitments {
            project_id,
            week_start,
        } => Some(serde_json::json!({
            "project_id": project_id,
            "week_start": week_start,
        })),
        ApiError::CycleDetected { nodes } => Some(serde_json::json!({ "nodes": nodes })),
        _ => None,
    };

    ErrorResponse {
        code: code.to_string(),
        message,
        details,
    }
    .to_json()
}

/// 解析日期字符串
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
        map_api_error(ApiError::ValidationError(format!(
            "日期格式错误（应为YYYY-MM-DD）: {} ({})",
            date_str, e
        )))
    })
}

pub(crate) fn parse_optional_date(date_str: Option<&str>) -> Result<Option<NaiveDate>, String> {
    date_str.map(parse_date).transpose()
}

/// 解析命令载荷 (空串视为 `{}`)
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: &str) -> Result<T, String> {
    let payload = if payload.trim().is_empty() { "{}" } else { payload };
    serde_json::from_str(payload)
        .map_err(|e| map_api_error(ApiError::ValidationError(format!("请求参数解析失败: {}", e))))
}

/// 序列化命令结果
pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| {
        tracing::error!(error = %e, "命令结果序列化失败");
        ErrorResponse::new("INTERNAL_ERROR", GENERIC_INTERNAL_MESSAGE).to_json()
    })
}
