// ==========================================
// 节拍排程内核 - 工种间缓冲分析引擎
// ==========================================
// gap      = min(后工种段开始) - max(前工种段结束)   (有符号)
// consumed = max(0, buffer_size - gap)
// ratio    = consumed / buffer_size   (buffer_size == 0 时为 0)
// ==========================================

use tracing::debug;

use crate::config::PlanningConfig;
use crate::domain::plan::{BufferEntry, FlowlineData};
use crate::domain::types::BufferStatus;

#[derive(Debug, Clone)]
pub struct BufferAnalyzer {
    warning_ratio: f64,
    critical_ratio: f64,
}

impl Default for BufferAnalyzer {
    fn default() -> Self {
        Self::from_config(&PlanningConfig::default())
    }
}

impl BufferAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlanningConfig) -> Self {
        Self {
            warning_ratio: config.buffer_warning_ratio,
            critical_ratio: config.buffer_critical_ratio,
        }
    }

    /// 消耗比例 → 健康度 (阈值为严格大于)
    pub fn classify(&self, ratio: f64) -> BufferStatus {
        if ratio > self.critical_ratio {
            BufferStatus::Critical
        } else if ratio > self.warning_ratio {
            BufferStatus::Warning
        } else {
            BufferStatus::Healthy
        }
    }

    /// 相邻工种缓冲分析 (按车厢顺序)
    pub fn compute_buffers(&self, flowline: &FlowlineData) -> Vec<BufferEntry> {
        let size = flowline.buffer_size;

        let entries: Vec<BufferEntry> = flowline
            .wagons
            .windows(2)
            .filter_map(|pair| {
                let (current, next) = (&pair[0], &pair[1]);
                let current_end = current.latest_end()?;
                let next_start = next.earliest_start()?;

                let gap = i64::from(next_start) - i64::from(current_end);
                let consumed = (i64::from(size) - gap).max(0) as u32;
                let ratio = if size == 0 {
                    0.0
                } else {
                    f64::from(consumed) / f64::from(size)
                };

                Some(BufferEntry {
                    trade_pair: format!("{} → {}", current.trade.name, next.trade.name),
                    from_trade_id: current.trade.id.clone(),
                    to_trade_id: next.trade.id.clone(),
                    size,
                    gap,
                    consumed,
                    ratio,
                    status: self.classify(ratio),
                })
            })
            .collect();

        debug!(
            plan_id = %flowline.plan_id,
            pairs = entries.len(),
            critical = entries.iter().filter(|e| e.status == BufferStatus::Critical).count(),
            "缓冲分析完成"
        );

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{Trade, Zone};
    use crate::engine::flowline::FlowlineGenerator;

    fn flowline(takt: u32, buffer: u32) -> FlowlineData {
        let zones = vec![Zone::new("A", "A区", 1), Zone::new("B", "B区", 2), Zone::new("C", "C区", 3)];
        let trades = vec![
            Trade::new("s", "Structure", "COLUMNS", 5),
            Trade::new("m", "MEP", "HVAC_ROUGH_IN", 5),
            Trade::new("f", "Finishes", "PAINTING", 5),
        ];
        FlowlineGenerator::new()
            .compute_flowline_at("p", &zones, &trades, takt, buffer, 0.0)
            .unwrap()
    }

    #[test]
    fn test_reference_pair_is_fully_consumed() {
        let entries = BufferAnalyzer::new().compute_buffers(&flowline(5, 1));

        assert_eq!(entries.len(), 2);
        // 结构最晚结束 15, 机电最早开始 2 → gap = -13
        assert_eq!(entries[0].trade_pair, "Structure → MEP");
        assert_eq!(entries[0].gap, -13);
        assert_eq!(entries[0].consumed, 14);
        assert_eq!(entries[0].status, BufferStatus::Critical);
    }

    #[test]
    fn test_zero_buffer_is_always_healthy() {
        for takt in [1, 3, 10] {
            for e in BufferAnalyzer::new().compute_buffers(&flowline(takt, 0)) {
                assert_eq!(e.ratio, 0.0);
                assert_eq!(e.status, BufferStatus::Healthy);
            }
        }
    }

    #[test]
    fn test_classification_thresholds() {
        let analyzer = BufferAnalyzer::new();
        assert_eq!(analyzer.classify(0.3), BufferStatus::Healthy);
        assert_eq!(analyzer.classify(0.31), BufferStatus::Warning);
        assert_eq!(analyzer.classify(0.7), BufferStatus::Warning);
        assert_eq!(analyzer.classify(0.71), BufferStatus::Critical);

        let strict = BufferAnalyzer::from_config(&PlanningConfig {
            buffer_warning_ratio: 0.1,
            buffer_critical_ratio: 0.2,
            ..PlanningConfig::default()
        });
        assert_eq!(strict.classify(0.15), BufferStatus::Warning);
    }

    #[test]
    fn test_single_wagon_has_no_pairs() {
        let mut f = flowline(2, 1);
        f.wagons.truncate(1);
        assert!(BufferAnalyzer::new().compute_buffers(&f).is_empty());
    }
}
