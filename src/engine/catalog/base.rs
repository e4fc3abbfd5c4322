// ==========================================
// 关系库 - 基础目录 (各专业通用关系)
// ==========================================
// 红线: 基础目录必须无环
// 顺序即输出顺序,新增条目追加在各专业末尾
// ==========================================

use crate::domain::types::{Discipline, RelationshipType};

use RelationshipType::{FinishToFinish as FF, FinishToStart as FS, StartToFinish as SF, StartToStart as SS};

/// 静态关系定义
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleDef {
    pub predecessor: &'static str,
    pub successor: &'static str,
    pub kind: RelationshipType,
    pub lag_days: i32,
    pub mandatory: bool,
    pub description: &'static str,
}

const fn rule(
    predecessor: &'static str,
    successor: &'static str,
    kind: RelationshipType,
    lag_days: i32,
    mandatory: bool,
    description: &'static str,
) -> RuleDef {
    RuleDef {
        predecessor,
        successor,
        kind,
        lag_days,
        mandatory,
        description,
    }
}

/// 单专业目录
pub(crate) struct DisciplineCatalog {
    pub discipline: Discipline,
    pub rules: &'static [RuleDef],
}

// ===== 场地准备 =====
const SITE_PREP: &[RuleDef] = &[
    rule("SITE_CLEARANCE", "EXCAVATION", FS, 0, true, "场地清理完成后开挖"),
    rule("SITE_CLEARANCE", "SITE_UTILITIES", SS, 2, true, "清场开始2天后可进场敷设室外管网"),
    rule("EXCAVATION", "FOUNDATION", FS, 0, true, "基坑验槽后施工基础"),
];

// ===== 结构 =====
const STRUCTURAL: &[RuleDef] = &[
    rule("FOUNDATION", "WATERPROOFING", FS, 3, true, "基础混凝土养护3天后做防水"),
    rule("FOUNDATION", "COLUMNS", FS, 7, true, "基础强度达标(7天)后立柱"),
    rule("COLUMNS", "SLABS", SS, 2, true, "柱施工开始2天后可支楼板模板"),
    rule("SLABS", "ROOF_STRUCTURE", FS, 0, true, "楼板完成后施工屋面结构"),
];

// ===== 机电 (暖通/给排水/消防) =====
const MECHANICAL: &[RuleDef] = &[
    rule("SLABS", "HVAC_ROUGH_IN", FS, 3, true, "楼板拆模后暖通风管粗装"),
    rule("SLABS", "PLUMBING_ROUGH_IN", FS, 3, true, "楼板拆模后给排水粗装"),
    rule("PLUMBING_ROUGH_IN", "FIRE_SPRINKLER", SS, 1, false, "喷淋主管可随给排水粗装跟进"),
];

// ===== 电气 =====
const ELECTRICAL: &[RuleDef] = &[
    rule("SLABS", "ELECTRICAL_ROUGH_IN", FS, 3, true, "楼板拆模后电气桥架与管线粗装"),
    rule("ELECTRICAL_ROUGH_IN", "ELECTRICAL_FINISH", FS, 0, true, "粗装验收后电气精装"),
];

// ===== 建筑装饰 =====
const ARCHITECTURAL: &[RuleDef] = &[
    rule("COLUMNS", "MASONRY", FS, 5, true, "主体结构完成5天后砌筑"),
    rule("ROOF_STRUCTURE", "ROOFING", FS, 0, true, "屋面结构完成后做屋面防水层"),
    rule("COLUMNS", "FACADE", SS, 10, false, "外立面可在主体施工10天后插入"),
    rule("DRYWALL", "CEILING", FS, 0, true, "隔墙封板后吊顶"),
    rule("DRYWALL", "PAINTING", FS, 2, true, "隔墙批嵌干燥2天后涂装"),
    rule("CEILING", "PAINTING", FF, 0, true, "涂装不得早于吊顶完成"),
    rule("PAINTING", "FLOORING", FS, -1, false, "地面可与末道涂装搭接1天"),
];

// ===== 景观 =====
const LANDSCAPE: &[RuleDef] = &[
    rule("SITE_UTILITIES", "LANDSCAPING", FS, 0, true, "室外管网回填后做景观"),
    rule("FACADE", "LANDSCAPING", FS, 0, false, "外立面脚手架拆除后做景观"),
];

// ===== 跨专业 =====
const CROSS_DISCIPLINE: &[RuleDef] = &[
    rule("HVAC_ROUGH_IN", "DRYWALL", FS, 0, true, "暖通隐蔽验收后封板"),
    rule("PLUMBING_ROUGH_IN", "DRYWALL", FS, 0, true, "给排水试压后封板"),
    rule("ELECTRICAL_ROUGH_IN", "DRYWALL", FS, 0, true, "电气隐蔽验收后封板"),
    rule("FIRE_SPRINKLER", "CEILING", FS, 0, true, "喷淋试压后封吊顶"),
    rule("CEILING", "HVAC_FINISH", FS, 0, true, "吊顶完成后安装风口"),
    rule("CEILING", "ELECTRICAL_FINISH", FS, 0, true, "吊顶完成后安装灯具面板"),
    rule("ELECTRICAL_FINISH", "TEMP_SERVICES", SF, 0, true, "正式供电启用前临时用电不得拆除"),
    rule("MASONRY", "PLUMBING_ROUGH_IN", SS, 2, false, "砌筑2天后可预埋给排水套管"),
];

pub(crate) const BASE_CATALOG: &[DisciplineCatalog] = &[
    DisciplineCatalog { discipline: Discipline::SitePrep, rules: SITE_PREP },
    DisciplineCatalog { discipline: Discipline::Structural, rules: STRUCTURAL },
    DisciplineCatalog { discipline: Discipline::Mechanical, rules: MECHANICAL },
    DisciplineCatalog { discipline: Discipline::Electrical, rules: ELECTRICAL },
    DisciplineCatalog { discipline: Discipline::Architectural, rules: ARCHITECTURAL },
    DisciplineCatalog { discipline: Discipline::Landscape, rules: LANDSCAPE },
    DisciplineCatalog { discipline: Discipline::CrossDiscipline, rules: CROSS_DISCIPLINE },
];
