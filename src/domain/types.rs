// ==========================================
// 节拍排程内核 - 领域类型定义
// ==========================================
// 依据: 末位计划者体系 (Last Planner System) 术语
// 依据: 四类活动逻辑关系 FS / SS / FF / SF
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 逻辑关系类型 (Relationship Type)
// ==========================================
// 序列化格式: FS / SS / FF / SF (行业通用缩写)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "FS")]
    FinishToStart, // 完成-开始
    #[serde(rename = "SS")]
    StartToStart, // 开始-开始
    #[serde(rename = "FF")]
    FinishToFinish, // 完成-完成
    #[serde(rename = "SF")]
    StartToFinish, // 开始-完成
}

impl RelationshipType {
    pub fn as_code(&self) -> &'static str {
        match self {
            RelationshipType::FinishToStart => "FS",
            RelationshipType::StartToStart => "SS",
            RelationshipType::FinishToFinish => "FF",
            RelationshipType::StartToFinish => "SF",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 专业类别 (Discipline)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    SitePrep,        // 场地准备
    Structural,      // 结构
    Mechanical,      // 机电暖通/给排水
    Electrical,      // 电气
    Architectural,   // 建筑装饰
    Landscape,       // 景观
    CrossDiscipline, // 跨专业
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::SitePrep => write!(f, "site_prep"),
            Discipline::Structural => write!(f, "structural"),
            Discipline::Mechanical => write!(f, "mechanical"),
            Discipline::Electrical => write!(f, "electrical"),
            Discipline::Architectural => write!(f, "architectural"),
            Discipline::Landscape => write!(f, "landscape"),
            Discipline::CrossDiscipline => write!(f, "cross_discipline"),
        }
    }
}

// ==========================================
// 项目类型 (Project Type)
// ==========================================
// 决定关系库追加哪些扩展目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    General,     // 通用
    Residential, // 住宅
    Commercial,  // 商业
    Hospital,    // 医院
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectType::General => write!(f, "general"),
            ProjectType::Residential => write!(f, "residential"),
            ProjectType::Commercial => write!(f, "commercial"),
            ProjectType::Hospital => write!(f, "hospital"),
        }
    }
}

// ==========================================
// 流水段状态 (Segment Status)
// ==========================================
// 红线: Delayed 只能由下游进度上报赋值,生成器不产生
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Planned,    // 计划
    InProgress, // 进行中
    Completed,  // 已完成
    Delayed,    // 延误
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentStatus::Planned => write!(f, "planned"),
            SegmentStatus::InProgress => write!(f, "in_progress"),
            SegmentStatus::Completed => write!(f, "completed"),
            SegmentStatus::Delayed => write!(f, "delayed"),
        }
    }
}

// ==========================================
// 缓冲健康度 (Buffer Status)
// ==========================================
// 顺序: Healthy < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferStatus {
    Healthy,  // 正常
    Warning,  // 关注
    Critical, // 危险
}

impl fmt::Display for BufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferStatus::Healthy => write!(f, "healthy"),
            BufferStatus::Warning => write!(f, "warning"),
            BufferStatus::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 作业进度状态 (Progress Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted, // 未开始
    InProgress, // 进行中
    Completed,  // 已完成
    Delayed,    // 延误
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressStatus::NotStarted => write!(f, "not_started"),
            ProgressStatus::InProgress => write!(f, "in_progress"),
            ProgressStatus::Completed => write!(f, "completed"),
            ProgressStatus::Delayed => write!(f, "delayed"),
        }
    }
}

impl std::str::FromStr for ProgressStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            "delayed" => Ok(ProgressStatus::Delayed),
            other => Err(format!("未知进度状态: {}", other)),
        }
    }
}

// ==========================================
// 未完成原因分类 (Variance Category)
// ==========================================
// 依据: LPS 常用原因分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceCategory {
    Prerequisite, // 前置工作未完成
    Labor,        // 劳动力
    Material,     // 材料
    Equipment,    // 机具设备
    Design,       // 设计/信息
    Weather,      // 天气
    Inspection,   // 验收检查
    Safety,       // 安全
    Coordination, // 协调
    Other,        // 其他
}

impl VarianceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceCategory::Prerequisite => "prerequisite",
            VarianceCategory::Labor => "labor",
            VarianceCategory::Material => "material",
            VarianceCategory::Equipment => "equipment",
            VarianceCategory::Design => "design",
            VarianceCategory::Weather => "weather",
            VarianceCategory::Inspection => "inspection",
            VarianceCategory::Safety => "safety",
            VarianceCategory::Coordination => "coordination",
            VarianceCategory::Other => "other",
        }
    }
}

impl fmt::Display for VarianceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VarianceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prerequisite" => Ok(VarianceCategory::Prerequisite),
            "labor" => Ok(VarianceCategory::Labor),
            "material" => Ok(VarianceCategory::Material),
            "equipment" => Ok(VarianceCategory::Equipment),
            "design" => Ok(VarianceCategory::Design),
            "weather" => Ok(VarianceCategory::Weather),
            "inspection" => Ok(VarianceCategory::Inspection),
            "safety" => Ok(VarianceCategory::Safety),
            "coordination" => Ok(VarianceCategory::Coordination),
            "other" => Ok(VarianceCategory::Other),
            other => Err(format!("未知原因分类: {}", other)),
        }
    }
}
