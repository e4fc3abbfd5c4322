// ==========================================
// 节拍排程内核 - PPC 计算引擎
// ==========================================
// 依据: 末位计划者体系 PPC = 已完成承诺 / 全部承诺
// ==========================================
// 步骤:
//   1. 过滤 {project_id, week_start, committed = true}, 为空 → NoCommitments
//   2. ppc_percent = round1(completed / total * 100)
//   3. 分工种统计 (按 trade_id 排序)
//   4. 未完成原因: 按原文分组计数, 次数降序, 同次数按首次出现, 截断到上限
// ==========================================
// 红线: 无承诺时报错,不得返回 0%
// 红线: 纯计算, 不触碰存储
// ==========================================

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::PlanningConfig;
use crate::domain::commitment::WeeklyCommitment;
use crate::domain::ppc::{PpcRecord, PpcSummary, TradePpc, VarianceReasonCount, VarianceWeek};
use crate::engine::flowline::round1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PpcError {
    #[error("该周无计划承诺: project_id={project_id}, week_start={week_start}")]
    NoCommitments {
        project_id: String,
        week_start: NaiveDate,
    },
}

fn percent(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round1(f64::from(completed) / f64::from(total) * 100.0)
    }
}

// ==========================================
// PpcCalculator - PPC 计算器
// ==========================================
#[derive(Debug, Clone)]
pub struct PpcCalculator {
    variance_limit: usize,
}

impl Default for PpcCalculator {
    fn default() -> Self {
        Self::from_config(&PlanningConfig::default())
    }
}

impl PpcCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlanningConfig) -> Self {
        Self {
            variance_limit: config.variance_reason_limit,
        }
    }

    /// 计算单周 PPC
    ///
    /// # 参数
    /// - `commitments`: 台账 (可含其他项目/其他周, 内部过滤)
    ///
    /// # 返回
    /// - Ok(PpcRecord)
    /// - Err(PpcError::NoCommitments): 该周没有 committed=true 的条目
    pub fn calculate(
        &self,
        project_id: &str,
        week_start: NaiveDate,
        commitments: &[WeeklyCommitment],
    ) -> Result<PpcRecord, PpcError> {
        let week: Vec<&WeeklyCommitment> = commitments
            .iter()
            .filter(|c| c.project_id == project_id && c.week_start == week_start && c.committed)
            .collect();

        if week.is_empty() {
            return Err(PpcError::NoCommitments {
                project_id: project_id.to_string(),
                week_start,
            });
        }

        let total_committed = week.len() as u32;
        let total_completed = week.iter().filter(|c| c.completed).count() as u32;
        let week_end = week.iter().map(|c| c.week_end).max().unwrap_or(week_start);

        let record = PpcRecord {
            project_id: project_id.to_string(),
            week_start,
            week_end,
            total_committed,
            total_completed,
            ppc_percent: percent(total_completed, total_committed),
            by_trade: Self::trade_breakdown(&week),
            top_variance_reasons: self.rank_variance_reasons(&week),
        };

        info!(
            project_id = %project_id,
            week_start = %week_start,
            total_committed = record.total_committed,
            total_completed = record.total_completed,
            ppc_percent = record.ppc_percent,
            "PPC计算完成"
        );

        Ok(record)
    }

    /// 分工种 PPC (按 trade_id 升序)
    fn trade_breakdown(week: &[&WeeklyCommitment]) -> Vec<TradePpc> {
        let mut by_trade: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
        for c in week {
            let entry = by_trade.entry(c.trade_id.as_str()).or_default();
            entry.0 += 1;
            if c.completed {
                entry.1 += 1;
            }
        }

        by_trade
            .into_iter()
            .map(|(trade_id, (committed, completed))| TradePpc {
                trade_id: trade_id.to_string(),
                committed,
                completed,
                ppc_percent: percent(completed, committed),
            })
            .collect()
    }

    /// 未完成原因排名
    fn rank_variance_reasons(&self, items: &[&WeeklyCommitment]) -> Vec<VarianceReasonCount> {
        let mut ranked: Vec<VarianceReasonCount> = Vec::new();
        for c in items.iter().filter(|c| c.has_variance()) {
            let Some(reason) = c.variance_reason.as_deref() else {
                continue;
            };
            match ranked.iter_mut().find(|r| r.reason == reason) {
                Some(existing) => {
                    existing.count += 1;
                    if existing.category.is_none() {
                        existing.category = c.variance_category;
                    }
                }
                None => ranked.push(VarianceReasonCount {
                    reason: reason.to_string(),
                    category: c.variance_category,
                    count: 1,
                }),
            }
        }

        // 稳定排序: 同次数保持首次出现顺序
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(self.variance_limit);
        ranked
    }

    /// 分工种 PPC (可选限定某周), 直接从台账重算
    pub fn trade_ppc(
        &self,
        project_id: &str,
        week_start: Option<NaiveDate>,
        commitments: &[WeeklyCommitment],
    ) -> Vec<TradePpc> {
        let items: Vec<&WeeklyCommitment> = commitments
            .iter()
            .filter(|c| c.project_id == project_id && c.committed)
            .filter(|c| week_start.map_or(true, |w| c.week_start == w))
            .collect();
        Self::trade_breakdown(&items)
    }

    /// 未完成原因 (可选限定某周), 直接从台账重算
    pub fn variance_reasons(
        &self,
        project_id: &str,
        week_start: Option<NaiveDate>,
        commitments: &[WeeklyCommitment],
    ) -> Vec<VarianceReasonCount> {
        let items: Vec<&WeeklyCommitment> = commitments
            .iter()
            .filter(|c| c.project_id == project_id && c.committed)
            .filter(|c| week_start.map_or(true, |w| c.week_start == w))
            .collect();
        self.rank_variance_reasons(&items)
    }

    /// 逐周未完成统计 (按 week_start 升序)
    pub fn variance_history(&self, project_id: &str, commitments: &[WeeklyCommitment]) -> Vec<VarianceWeek> {
        let mut weeks: BTreeMap<NaiveDate, VarianceWeek> = BTreeMap::new();

        for c in commitments
            .iter()
            .filter(|c| c.project_id == project_id && c.committed)
        {
            let week = weeks.entry(c.week_start).or_insert_with(|| VarianceWeek {
                week_start: c.week_start,
                week_end: c.week_end,
                total_committed: 0,
                not_completed: 0,
                with_reason: 0,
                by_category: BTreeMap::new(),
            });
            week.week_end = week.week_end.max(c.week_end);
            week.total_committed += 1;

            if c.completed {
                continue;
            }
            week.not_completed += 1;
            if c.variance_reason.is_some() {
                week.with_reason += 1;
            }
            let category = c
                .variance_category
                .map(|v| v.as_str().to_string())
                .unwrap_or_else(|| "uncategorized".to_string());
            *week.by_category.entry(category).or_default() += 1;
        }

        debug!(project_id = %project_id, weeks = weeks.len(), "未完成历史重算完成");
        weeks.into_values().collect()
    }

    /// 当前 PPC 与趋势
    ///
    /// 记录按 week_start 升序排列后取最新两周; 不足两周时 trend 为 None
    pub fn summarize(&self, project_id: &str, records: &[PpcRecord]) -> PpcSummary {
        let mut sorted: Vec<&PpcRecord> = records.iter().filter(|r| r.project_id == project_id).collect();
        sorted.sort_by_key(|r| r.week_start);

        let current = sorted.last().map(|r| r.ppc_percent);
        let previous = sorted.len().checked_sub(2).map(|i| sorted[i].ppc_percent);
        let trend = match (current, previous) {
            (Some(c), Some(p)) => Some(round1(c - p)),
            _ => None,
        };
        let average = if sorted.is_empty() {
            None
        } else {
            let sum: f64 = sorted.iter().map(|r| r.ppc_percent).sum();
            Some(round1(sum / sorted.len() as f64))
        };

        PpcSummary {
            project_id: project_id.to_string(),
            current,
            previous,
            trend,
            average,
            weeks_count: sorted.len(),
            latest_week_start: sorted.last().map(|r| r.week_start),
        }
    }
}
