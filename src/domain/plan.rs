// ==========================================
// 节拍排程内核 - 节拍计划领域模型
// ==========================================
// 依据: 节拍计划 = 区域(行) x 工种(列偏移) x 节拍时间
// 红线: FlowlineData 重新生成时整体替换,不做合并
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::{BufferStatus, SegmentStatus};

// ==========================================
// Zone - 施工区域
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,    // 区域ID
    pub name: String,  // 区域名称
    pub sequence: u32, // 施工顺序号
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>, sequence: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sequence,
        }
    }
}

// ==========================================
// Trade - 工种 (车厢 wagon)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,         // 工种ID
    pub name: String,       // 工种名称
    pub color: String,      // 展示颜色
    pub code: String,       // 工种代码 (对应关系库)
    pub duration_days: u32, // 单区作业天数
}

impl Trade {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        duration_days: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: "#808080".to_string(),
            code: code.into(),
            duration_days,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

// ==========================================
// Segment - 流水段
// ==========================================
// 不变量: x_end - x_start == takt_time, x_start >= 0
// x 为节拍周期偏移,不是日历日期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub zone_index: u32,
    pub x_start: u32,
    pub x_end: u32,
    pub y: u32,
    pub status: SegmentStatus,
}

impl Segment {
    /// 区间是否与另一流水段重叠 (端点相接不算重叠)
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.x_start < other.x_end && other.x_start < self.x_end
    }
}

// ==========================================
// Wagon - 单工种在全部区域上的流水段集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wagon {
    pub trade: Trade,
    pub segments: Vec<Segment>,
}

impl Wagon {
    pub fn earliest_start(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.x_start).min()
    }

    pub fn latest_end(&self) -> Option<u32> {
        self.segments.iter().map(|s| s.x_end).max()
    }
}

// ==========================================
// FlowlineData - 流水线聚合
// ==========================================
// 每个排程版本一份
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowlineData {
    pub plan_id: String,
    pub zones: Vec<Zone>,
    pub wagons: Vec<Wagon>,
    pub today_x: f64,
    pub total_periods: u32,
    pub takt_time: u32,
    pub buffer_size: u32,
}

impl FlowlineData {
    pub fn segment_count(&self) -> usize {
        self.wagons.iter().map(|w| w.segments.len()).sum()
    }

    /// 按工种ID查找车厢
    pub fn wagon_by_trade_id(&self, trade_id: &str) -> Option<&Wagon> {
        self.wagons.iter().find(|w| w.trade.id == trade_id)
    }

    /// 按区域ID查找区域下标
    pub fn zone_index_of(&self, zone_id: &str) -> Option<usize> {
        self.zones.iter().position(|z| z.id == zone_id)
    }
}

// ==========================================
// BufferEntry - 工种间缓冲分析 (派生,不单独持久化)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferEntry {
    pub trade_pair: String,  // "结构 → 机电"
    pub from_trade_id: String,
    pub to_trade_id: String,
    pub size: u32,           // 计划缓冲
    pub gap: i64,            // 实际间隔 (可为负)
    pub consumed: u32,       // 已消耗缓冲
    pub ratio: f64,          // 消耗比例
    pub status: BufferStatus,
}

// ==========================================
// StackingConflict - 工种堆叠告警
// ==========================================
// 同一区域两个工种作业区间重叠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingConflict {
    pub zone_id: String,
    pub zone_index: u32,
    pub first_trade_id: String,
    pub second_trade_id: String,
    pub overlap_start: u32,
    pub overlap_end: u32,
}

// ==========================================
// FlowlineSummary - 计划统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowlineSummary {
    pub plan_id: String,
    pub total_periods: u32,
    pub num_zones: usize,
    pub num_trades: usize,
    pub total_segments: usize,
    pub planned_segments: usize,
    pub in_progress_segments: usize,
    pub completed_segments: usize,
    pub delayed_segments: usize,
    pub overall_progress_pct: f64,
}
