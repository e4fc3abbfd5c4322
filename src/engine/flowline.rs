// ==========================================
// 节拍排程内核 - 流水线生成引擎
// ==========================================
// 输入: 区域 + 有序工种 + 节拍时间 + 缓冲
// 输出: FlowlineData (确定性的流水段布局)
// ==========================================
// 公式:
//   total_periods = Z + T - 1 + (T - 1) * buffer
//   offset(i)     = i * (1 + buffer)
//   x_start(i, z) = offset(i) + z * takt
// 红线: 相同输入 + 相同 today_x → 逐字节一致的流水段
// 红线: 生成器不产生 Delayed 状态
// ==========================================

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::PlanningConfig;
use crate::domain::plan::{
    FlowlineData, FlowlineSummary, Segment, StackingConflict, Trade, Wagon, Zone,
};
use crate::domain::types::SegmentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowlineError {
    #[error("计划ID不能为空")]
    EmptyPlanId,

    #[error("至少需要一个区域")]
    NoZones,

    #[error("至少需要一个工种")]
    NoTrades,

    #[error("节拍时间超出范围: {value} (允许 1..={max})")]
    TaktTimeOutOfRange { value: u32, max: u32 },

    #[error("缓冲超出范围: {value} (允许 0..={max})")]
    BufferOutOfRange { value: u32, max: u32 },

    #[error("工种 {trade_id} 作业天数超出范围: {value} (允许 1..={max})")]
    DurationOutOfRange { trade_id: String, value: u32, max: u32 },

    #[error("区域ID重复: {0}")]
    DuplicateZone(String),

    #[error("工种ID重复: {0}")]
    DuplicateTrade(String),

    #[error("today_x 非法: {0}")]
    InvalidToday(f64),
}

/// 四舍五入到一位小数
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ==========================================
// FlowlineGenerator - 流水线生成器
// ==========================================
#[derive(Debug, Clone)]
pub struct FlowlineGenerator {
    today_ratio: f64,
    max_takt_time: u32,
    max_buffer_size: u32,
    max_duration_days: u32,
}

impl Default for FlowlineGenerator {
    fn default() -> Self {
        Self::from_config(&PlanningConfig::default())
    }
}

impl FlowlineGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlanningConfig) -> Self {
        Self {
            today_ratio: config.today_ratio,
            max_takt_time: config.max_takt_time,
            max_buffer_size: config.max_buffer_size,
            max_duration_days: config.max_duration_days,
        }
    }

    pub fn today_ratio(&self) -> f64 {
        self.today_ratio
    }

    /// 计划总周期数
    pub fn total_periods(zone_count: usize, trade_count: usize, buffer_size: u32) -> u32 {
        if zone_count == 0 || trade_count == 0 {
            return 0;
        }
        let z = zone_count as u32;
        let t = trade_count as u32;
        z + t - 1 + (t - 1) * buffer_size
    }

    /// 生成流水线 (today 游标取 total_periods * today_ratio)
    pub fn compute_flowline(
        &self,
        plan_id: &str,
        zones: &[Zone],
        trades: &[Trade],
        takt_time: u32,
        buffer_size: u32,
    ) -> Result<FlowlineData, FlowlineError> {
        let total = Self::total_periods(zones.len(), trades.len(), buffer_size);
        let today_x = f64::from(total) * self.today_ratio;
        self.compute_flowline_at(plan_id, zones, trades, takt_time, buffer_size, today_x)
    }

    /// 生成流水线 (显式 today 游标)
    ///
    /// # 参数
    /// - `zones`: 区域 (按 sequence 稳定排序后布局)
    /// - `trades`: 工种 (按给定顺序布局)
    /// - `today_x`: 游标位置, 须为有限非负数
    #[instrument(skip(self, zones, trades), fields(zones = zones.len(), trades = trades.len()))]
    pub fn compute_flowline_at(
        &self,
        plan_id: &str,
        zones: &[Zone],
        trades: &[Trade],
        takt_time: u32,
        buffer_size: u32,
        today_x: f64,
    ) -> Result<FlowlineData, FlowlineError> {
        self.validate(plan_id, zones, trades, takt_time, buffer_size, today_x)?;

        let mut ordered_zones = zones.to_vec();
        ordered_zones.sort_by_key(|z| z.sequence);

        let total_periods = Self::total_periods(ordered_zones.len(), trades.len(), buffer_size);

        let wagons: Vec<Wagon> = trades
            .iter()
            .enumerate()
            .map(|(i, trade)| {
                let offset = i as u32 * (1 + buffer_size);
                let segments = (0..ordered_zones.len() as u32)
                    .map(|z| {
                        let x_start = offset + z * takt_time;
                        let x_end = x_start + takt_time;
                        Segment {
                            zone_index: z,
                            x_start,
                            x_end,
                            y: z,
                            status: status_at(x_start, x_end, today_x),
                        }
                    })
                    .collect();
                Wagon {
                    trade: trade.clone(),
                    segments,
                }
            })
            .collect();

        let flowline = FlowlineData {
            plan_id: plan_id.to_string(),
            zones: ordered_zones,
            wagons,
            today_x,
            total_periods,
            takt_time,
            buffer_size,
        };

        info!(
            plan_id = %plan_id,
            total_periods = total_periods,
            segments = flowline.segment_count(),
            today_x = today_x,
            "流水线生成完成"
        );

        Ok(flowline)
    }

    fn validate(
        &self,
        plan_id: &str,
        zones: &[Zone],
        trades: &[Trade],
        takt_time: u32,
        buffer_size: u32,
        today_x: f64,
    ) -> Result<(), FlowlineError> {
        if plan_id.trim().is_empty() {
            return Err(FlowlineError::EmptyPlanId);
        }
        if zones.is_empty() {
            return Err(FlowlineError::NoZones);
        }
        if trades.is_empty() {
            return Err(FlowlineError::NoTrades);
        }
        if takt_time == 0 || takt_time > self.max_takt_time {
            return Err(FlowlineError::TaktTimeOutOfRange {
                value: takt_time,
                max: self.max_takt_time,
            });
        }
        if buffer_size > self.max_buffer_size {
            return Err(FlowlineError::BufferOutOfRange {
                value: buffer_size,
                max: self.max_buffer_size,
            });
        }
        if !today_x.is_finite() || today_x < 0.0 {
            return Err(FlowlineError::InvalidToday(today_x));
        }

        let mut zone_ids = HashSet::new();
        for z in zones {
            if !zone_ids.insert(z.id.as_str()) {
                return Err(FlowlineError::DuplicateZone(z.id.clone()));
            }
        }

        let mut trade_ids = HashSet::new();
        for t in trades {
            if !trade_ids.insert(t.id.as_str()) {
                return Err(FlowlineError::DuplicateTrade(t.id.clone()));
            }
            if t.duration_days == 0 || t.duration_days > self.max_duration_days {
                return Err(FlowlineError::DurationOutOfRange {
                    trade_id: t.id.clone(),
                    value: t.duration_days,
                    max: self.max_duration_days,
                });
            }
        }

        Ok(())
    }

    /// 工种堆叠检测: 同一区域内两个工种作业区间重叠
    ///
    /// 输出顺序: 区域下标 → 前工种 → 后工种
    pub fn detect_trade_stacking(&self, flowline: &FlowlineData) -> Vec<StackingConflict> {
        let mut conflicts = Vec::new();

        for (zone_index, zone) in flowline.zones.iter().enumerate() {
            let zone_index = zone_index as u32;
            let in_zone: Vec<(&Wagon, &Segment)> = flowline
                .wagons
                .iter()
                .filter_map(|w| {
                    w.segments
                        .iter()
                        .find(|s| s.zone_index == zone_index)
                        .map(|s| (w, s))
                })
                .collect();

            for (i, (first, a)) in in_zone.iter().enumerate() {
                for (second, b) in in_zone.iter().skip(i + 1) {
                    if a.overlaps(b) {
                        conflicts.push(StackingConflict {
                            zone_id: zone.id.clone(),
                            zone_index,
                            first_trade_id: first.trade.id.clone(),
                            second_trade_id: second.trade.id.clone(),
                            overlap_start: a.x_start.max(b.x_start),
                            overlap_end: a.x_end.min(b.x_end),
                        });
                    }
                }
            }
        }

        debug!(
            plan_id = %flowline.plan_id,
            conflicts = conflicts.len(),
            "工种堆叠检测完成"
        );

        conflicts
    }

    /// 计划统计
    pub fn summarize(&self, flowline: &FlowlineData) -> FlowlineSummary {
        let mut planned = 0;
        let mut in_progress = 0;
        let mut completed = 0;
        let mut delayed = 0;

        for s in flowline.wagons.iter().flat_map(|w| w.segments.iter()) {
            match s.status {
                SegmentStatus::Planned => planned += 1,
                SegmentStatus::InProgress => in_progress += 1,
                SegmentStatus::Completed => completed += 1,
                SegmentStatus::Delayed => delayed += 1,
            }
        }

        let total = flowline.segment_count();
        let overall_progress_pct = if total == 0 {
            0.0
        } else {
            round1(completed as f64 / total as f64 * 100.0)
        };

        FlowlineSummary {
            plan_id: flowline.plan_id.clone(),
            total_periods: flowline.total_periods,
            num_zones: flowline.zones.len(),
            num_trades: flowline.wagons.len(),
            total_segments: total,
            planned_segments: planned,
            in_progress_segments: in_progress,
            completed_segments: completed,
            delayed_segments: delayed,
            overall_progress_pct,
        }
    }
}

fn status_at(x_start: u32, x_end: u32, today_x: f64) -> SegmentStatus {
    if f64::from(x_end) <= today_x {
        SegmentStatus::Completed
    } else if f64::from(x_start) <= today_x {
        SegmentStatus::InProgress
    } else {
        SegmentStatus::Planned
    }
}
