// ==========================================
// 节拍排程内核 - 作业进度状态机
// ==========================================
// 规则:
//   percent == 100                       → Completed
//   显式 delayed 且 percent < 100        → Delayed
//   NotStarted 且 percent > 0            → InProgress
//   Completed 且 percent < 100           → InProgress (0 时回到 NotStarted)
//   显式 not_started 且 percent > 0      → 拒绝
//   其他情况                              → 保持原状态
// 红线: 每次上报都保留上一次进度
// ==========================================

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::debug;

use crate::domain::plan::FlowlineData;
use crate::domain::progress::{ProgressRecord, ProgressUpdate};
use crate::domain::types::{ProgressStatus, SegmentStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProgressError {
    #[error("完成百分比必须在 0..=100 之间: {0}")]
    PercentOutOfRange(f64),

    #[error("完成百分比为 100 时不能标记为 {0}")]
    StatusConflict(ProgressStatus),

    #[error("标记完成时百分比必须为 100: {0}")]
    CompletedBelowFull(f64),

    #[error("已有进度时不能标记为未开始: {0}")]
    NotStartedWithProgress(f64),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressTracker;

impl ProgressTracker {
    pub fn new() -> Self {
        Self
    }

    /// 应用一次进度上报
    ///
    /// # 参数
    /// - `current`: 已有记录, 首次上报为 None
    pub fn apply(
        &self,
        current: Option<ProgressRecord>,
        update: &ProgressUpdate,
        now: NaiveDateTime,
    ) -> Result<ProgressRecord, ProgressError> {
        let percent = update.percent_complete;
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ProgressError::PercentOutOfRange(percent));
        }

        let mut record = current.unwrap_or_else(|| {
            ProgressRecord::not_started(
                update.assignment_id.clone(),
                update.zone_id.clone(),
                update.trade_id.clone(),
                now,
            )
        });

        let status = if percent >= 100.0 {
            match update.status {
                Some(s @ (ProgressStatus::Delayed | ProgressStatus::NotStarted | ProgressStatus::InProgress)) => {
                    return Err(ProgressError::StatusConflict(s));
                }
                _ => ProgressStatus::Completed,
            }
        } else {
            match update.status {
                Some(ProgressStatus::Delayed) => ProgressStatus::Delayed,
                Some(ProgressStatus::Completed) => {
                    return Err(ProgressError::CompletedBelowFull(percent));
                }
                Some(ProgressStatus::NotStarted) if percent > 0.0 => {
                    return Err(ProgressError::NotStartedWithProgress(percent));
                }
                Some(explicit) => explicit,
                None => match record.status {
                    ProgressStatus::NotStarted | ProgressStatus::Completed if percent > 0.0 => {
                        ProgressStatus::InProgress
                    }
                    ProgressStatus::Completed => ProgressStatus::NotStarted,
                    unchanged => unchanged,
                },
            }
        };

        record.previous_percent = record.percent_complete;
        record.percent_complete = percent;
        record.status = status;
        if update.note.is_some() {
            record.note = update.note.clone();
        }
        record.updated_at = now;

        debug!(
            assignment_id = %record.assignment_id,
            zone_id = %record.zone_id,
            trade_id = %record.trade_id,
            previous = record.previous_percent,
            percent = record.percent_complete,
            status = %record.status,
            "进度状态更新"
        );

        Ok(record)
    }

    /// 将进度叠加到流水线
    ///
    /// 有进度上报的 (工种, 区域) 段以上报状态为准; NotStarted 不覆盖生成器状态
    pub fn overlay(&self, flowline: &FlowlineData, records: &[ProgressRecord]) -> FlowlineData {
        let mut result = flowline.clone();

        for record in records {
            let Some(zone_index) = result.zone_index_of(&record.zone_id) else {
                continue;
            };
            let Some(wagon) = result.wagons.iter_mut().find(|w| w.trade.id == record.trade_id) else {
                continue;
            };
            let status = match record.status {
                ProgressStatus::NotStarted => continue,
                ProgressStatus::InProgress => SegmentStatus::InProgress,
                ProgressStatus::Completed => SegmentStatus::Completed,
                ProgressStatus::Delayed => SegmentStatus::Delayed,
            };
            for segment in wagon
                .segments
                .iter_mut()
                .filter(|s| s.zone_index as usize == zone_index)
            {
                segment.status = status;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 11).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn update(percent: f64, status: Option<ProgressStatus>) -> ProgressUpdate {
        ProgressUpdate {
            assignment_id: "AS-1".to_string(),
            zone_id: "Z1".to_string(),
            trade_id: "T1".to_string(),
            percent_complete: percent,
            status,
            note: None,
        }
    }

    #[test]
    fn test_status_transitions() {
        let tracker = ProgressTracker::new();

        let r = tracker.apply(None, &update(0.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::NotStarted);

        let r = tracker.apply(Some(r), &update(40.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::InProgress);
        assert_eq!(r.previous_percent, 0.0);

        let r = tracker.apply(Some(r), &update(55.0, Some(ProgressStatus::Delayed)), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::Delayed);
        assert_eq!(r.previous_percent, 40.0);
        assert_eq!(r.delta(), 15.0);

        // 延误状态在无显式状态时保持
        let r = tracker.apply(Some(r), &update(70.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::Delayed);

        let r = tracker.apply(Some(r), &update(100.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::Completed);
        assert_eq!(r.previous_percent, 70.0);
    }

    #[test]
    fn test_completed_reopens_when_percent_drops() {
        let tracker = ProgressTracker::new();
        let done = tracker.apply(None, &update(100.0, None), now()).unwrap();
        assert_eq!(done.status, ProgressStatus::Completed);

        let r = tracker.apply(Some(done.clone()), &update(50.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::InProgress);
        assert_eq!(r.percent_complete, 50.0);
        assert_eq!(r.previous_percent, 100.0);

        let r = tracker.apply(Some(done), &update(0.0, None), now()).unwrap();
        assert_eq!(r.status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_explicit_not_started_requires_zero_percent() {
        let tracker = ProgressTracker::new();
        assert_eq!(
            tracker
                .apply(None, &update(30.0, Some(ProgressStatus::NotStarted)), now())
                .unwrap_err(),
            ProgressError::NotStartedWithProgress(30.0)
        );
        let r = tracker
            .apply(None, &update(0.0, Some(ProgressStatus::NotStarted)), now())
            .unwrap();
        assert_eq!(r.status, ProgressStatus::NotStarted);
    }

    #[test]
    fn test_rejects_invalid_percent() {
        let tracker = ProgressTracker::new();
        for bad in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            assert!(tracker.apply(None, &update(bad, None), now()).is_err());
        }
        assert_eq!(
            tracker.apply(None, &update(100.0, Some(ProgressStatus::Delayed)), now()).unwrap_err(),
            ProgressError::StatusConflict(ProgressStatus::Delayed)
        );
    }
}
