// ==========================================
// 关系库 - 项目类型扩展目录
// ==========================================
// 查询时按顺序并入基础目录之后,不修改基础目录
// ==========================================

use crate::domain::types::{ProjectType, RelationshipType};

use super::base::RuleDef;

use RelationshipType::FinishToStart as FS;

/// 扩展目录: 适用项目类型 + 追加关系
pub(crate) struct ExtensionCatalog {
    pub name: &'static str,
    pub applies_to: &'static [ProjectType],
    pub rules: &'static [RuleDef],
}

impl ExtensionCatalog {
    pub fn applies(&self, project_type: ProjectType) -> bool {
        self.applies_to.contains(&project_type)
    }
}

const COMMERCIAL_RULES: &[RuleDef] = &[
    RuleDef {
        predecessor: "SLABS",
        successor: "ELEVATOR_INSTALL",
        kind: FS,
        lag_days: 14,
        mandatory: true,
        description: "井道结构养护14天后安装电梯导轨",
    },
    RuleDef {
        predecessor: "ELEVATOR_INSTALL",
        successor: "FLOORING",
        kind: FS,
        lag_days: 0,
        mandatory: false,
        description: "电梯可用后垂直运输地面材料",
    },
    RuleDef {
        predecessor: "ELECTRICAL_FINISH",
        successor: "COMMISSIONING",
        kind: FS,
        lag_days: 0,
        mandatory: true,
        description: "电气精装完成后系统联调",
    },
];

const HOSPITAL_RULES: &[RuleDef] = &[
    RuleDef {
        predecessor: "PLUMBING_ROUGH_IN",
        successor: "MEDICAL_GAS",
        kind: FS,
        lag_days: 0,
        mandatory: true,
        description: "给排水粗装后敷设医用气体管道",
    },
    RuleDef {
        predecessor: "MEDICAL_GAS",
        successor: "DRYWALL",
        kind: FS,
        lag_days: 0,
        mandatory: true,
        description: "医用气体保压合格后封板",
    },
    RuleDef {
        predecessor: "MASONRY",
        successor: "RADIATION_SHIELDING",
        kind: FS,
        lag_days: 0,
        mandatory: true,
        description: "影像科墙体砌筑后做射线防护",
    },
    RuleDef {
        predecessor: "RADIATION_SHIELDING",
        successor: "DRYWALL",
        kind: FS,
        lag_days: 0,
        mandatory: true,
        description: "防护检测合格后封板",
    },
    RuleDef {
        predecessor: "HVAC_FINISH",
        successor: "COMMISSIONING",
        kind: FS,
        lag_days: 2,
        mandatory: true,
        description: "洁净区风量平衡稳定2天后联调",
    },
];

/// 有序扩展目录列表
pub(crate) const EXTENSIONS: &[ExtensionCatalog] = &[
    ExtensionCatalog {
        name: "commercial",
        applies_to: &[ProjectType::Commercial, ProjectType::Hospital],
        rules: COMMERCIAL_RULES,
    },
    ExtensionCatalog {
        name: "hospital",
        applies_to: &[ProjectType::Hospital],
        rules: HOSPITAL_RULES,
    },
];
