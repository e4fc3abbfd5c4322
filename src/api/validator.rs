// ==========================================
// 节拍排程内核 - 输入校验
// ==========================================
// 职责: 写入前的完整校验, 任何一项失败都不写入
// ==========================================

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::commitment::{CommitmentPatch, NewCommitment};
use crate::domain::daily_log::DailyLogInput;

/// 必填字符串校验
pub fn require_non_empty(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::ValidationError(format!("{}不能为空", field)));
    }
    Ok(())
}

/// 周区间校验: week_end >= week_start
pub fn validate_week(week_start: NaiveDate, week_end: NaiveDate) -> ApiResult<()> {
    if week_end < week_start {
        return Err(ApiError::ValidationError(format!(
            "week_end ({}) 早于 week_start ({})",
            week_end, week_start
        )));
    }
    Ok(())
}

/// 可选原因文本: 若提供则不能为空白
fn validate_reason(reason: Option<&str>) -> ApiResult<()> {
    if let Some(r) = reason {
        require_non_empty("variance_reason", r)?;
    }
    Ok(())
}

/// 单条承诺校验
pub fn validate_new_commitment(input: &NewCommitment) -> ApiResult<()> {
    require_non_empty("project_id", &input.project_id)?;
    require_non_empty("trade_id", &input.trade_id)?;
    require_non_empty("zone_id", &input.zone_id)?;
    require_non_empty("description", &input.description)?;
    validate_week(input.week_start, input.week_end)?;
    validate_reason(input.variance_reason.as_deref())
}

/// 批量承诺校验: 条数 1..=max_batch, 逐条校验并标出序号
pub fn validate_commitment_batch(items: &[NewCommitment], max_batch: usize) -> ApiResult<()> {
    if items.is_empty() {
        return Err(ApiError::ValidationError("批量创建至少需要 1 条承诺".to_string()));
    }
    if items.len() > max_batch {
        return Err(ApiError::ValidationError(format!(
            "批量创建最多 {} 条, 实际 {} 条",
            max_batch,
            items.len()
        )));
    }
    for (i, item) in items.iter().enumerate() {
        validate_new_commitment(item)
            .map_err(|e| ApiError::ValidationError(format!("第{}条: {}", i + 1, e)))?;
    }
    Ok(())
}

/// 承诺补丁校验
pub fn validate_patch(patch: &CommitmentPatch) -> ApiResult<()> {
    if patch.is_empty() {
        return Err(ApiError::ValidationError(
            "补丁至少包含 completed / variance_reason / variance_category 之一".to_string(),
        ));
    }
    validate_reason(patch.variance_reason.as_ref().and_then(Option::as_deref))
}

/// 施工日志校验
pub fn validate_daily_log(input: &DailyLogInput) -> ApiResult<()> {
    require_non_empty("project_id", &input.project_id)?;
    if let Some(t) = input.temperature_c {
        if !t.is_finite() {
            return Err(ApiError::ValidationError(format!("temperature_c 非法: {}", t)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewCommitment {
        NewCommitment {
            project_id: "P1".to_string(),
            week_start: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            week_end: NaiveDate::from_ymd_opt(2026, 3, 6).unwrap(),
            trade_id: "T1".to_string(),
            zone_id: "Z1".to_string(),
            description: "砌筑".to_string(),
            committed: true,
            completed: false,
            variance_reason: None,
            variance_category: None,
        }
    }

    #[test]
    fn test_inverted_week_rejected() {
        let mut c = input();
        c.week_end = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(matches!(validate_new_commitment(&c), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_batch_error_names_item() {
        let mut items = vec![input(), input()];
        items[1].description = "  ".to_string();
        match validate_commitment_batch(&items, 100) {
            Err(ApiError::ValidationError(msg)) => assert!(msg.contains("第2条")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
        assert!(validate_commitment_batch(&[], 100).is_err());
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(validate_patch(&CommitmentPatch::default()).is_err());
    }
}
