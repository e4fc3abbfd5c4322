// ==========================================
// 关系库 - 工种内部细分工序链
// ==========================================
// 仅描述单一工种内部顺序,不与其他工种耦合
// ==========================================

/// 工种代码 → 有序细分工序
pub(crate) const SUB_ACTIVITY_CHAINS: &[(&str, &[&str])] = &[
    (
        "EXCAVATION",
        &["EXCAVATION_SURVEY", "BULK_EXCAVATION", "SUB_GRADE_PREP"],
    ),
    (
        "FOUNDATION",
        &["BLINDING", "REBAR_FIXING", "FORMWORK", "CONCRETE_POUR", "CURING"],
    ),
    ("COLUMNS", &["COLUMN_REBAR", "COLUMN_FORMWORK", "COLUMN_POUR", "COLUMN_STRIP"]),
    ("SLABS", &["SLAB_FORMWORK", "SLAB_REBAR", "SLAB_POUR", "SLAB_CURING"]),
    (
        "HVAC_ROUGH_IN",
        &["DUCT_HANGERS", "DUCT_INSTALL", "DUCT_INSULATION", "DUCT_LEAK_TEST"],
    ),
    (
        "PLUMBING_ROUGH_IN",
        &["PIPE_SLEEVES", "PIPE_INSTALL", "PRESSURE_TEST"],
    ),
    (
        "ELECTRICAL_ROUGH_IN",
        &["CONTAINMENT", "CABLE_PULLING", "INSULATION_TEST"],
    ),
    ("DRYWALL", &["STUD_FRAMING", "BOARD_HANGING", "TAPING", "SANDING"]),
    ("PAINTING", &["SURFACE_PREP", "PRIMER", "FIRST_COAT", "FINAL_COAT"]),
];

pub(crate) fn chain_for(trade_code: &str) -> Option<&'static [&'static str]> {
    SUB_ACTIVITY_CHAINS
        .iter()
        .find(|(code, _)| *code == trade_code)
        .map(|(_, steps)| *steps)
}
