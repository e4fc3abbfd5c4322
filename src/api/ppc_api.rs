// ==========================================
// 节拍排程内核 - PPC API
// ==========================================
// 职责: 周 PPC 计算与保存, PPC 历史 / 趋势 / 分工种 / 未完成分析
// 红线: 同一 (project, week) 的计算串行, upsert 覆盖
// 红线: 未完成分析每次从台账重算, 不读缓存
// ==========================================

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::validator::require_non_empty;
use crate::domain::ppc::{PpcRecord, PpcSummary, TradePpc, VarianceReasonCount, VarianceWeek};
use crate::engine::PpcCalculator;
use crate::repository::key_lock::week_key;
use crate::repository::{CommitmentRepository, KeyedLock, PpcRecordRepository};

pub struct PpcApi {
    commitment_repo: Arc<dyn CommitmentRepository>,
    ppc_repo: Arc<dyn PpcRecordRepository>,
    locks: Arc<KeyedLock>,
    calculator: PpcCalculator,
}

impl PpcApi {
    pub fn new(
        commitment_repo: Arc<dyn CommitmentRepository>,
        ppc_repo: Arc<dyn PpcRecordRepository>,
        locks: Arc<KeyedLock>,
        calculator: PpcCalculator,
    ) -> Self {
        Self {
            commitment_repo,
            ppc_repo,
            locks,
            calculator,
        }
    }

    /// 计算并保存该周 PPC
    ///
    /// # 返回
    /// - Ok(PpcRecord): 已 upsert 的记录
    /// - Err(NoCommitments): 该周无承诺, 不写入
    pub fn calculate_ppc(&self, project_id: &str, week_start: NaiveDate) -> ApiResult<PpcRecord> {
        require_non_empty("project_id", project_id)?;

        let record = self
            .locks
            .with_key(&week_key(project_id, week_start), || -> ApiResult<PpcRecord> {
                let ledger = self.commitment_repo.list_by_week(project_id, week_start)?;
                let record = self.calculator.calculate(project_id, week_start, &ledger)?;
                self.ppc_repo.upsert(&record)?;
                Ok(record)
            })?;

        info!(
            project_id = %project_id,
            week_start = %week_start,
            ppc_percent = record.ppc_percent,
            "周 PPC 已保存"
        );
        Ok(record)
    }

    /// PPC 历史 (按 week_start 升序)
    pub fn history(&self, project_id: &str) -> ApiResult<Vec<PpcRecord>> {
        require_non_empty("project_id", project_id)?;
        Ok(self.ppc_repo.list_by_project(project_id)?)
    }

    pub fn get_week(&self, project_id: &str, week_start: NaiveDate) -> ApiResult<Option<PpcRecord>> {
        require_non_empty("project_id", project_id)?;
        Ok(self.ppc_repo.find_by_week(project_id, week_start)?)
    }

    /// 当前 PPC 与趋势
    pub fn current(&self, project_id: &str) -> ApiResult<PpcSummary> {
        let records = self.history(project_id)?;
        Ok(self.calculator.summarize(project_id, &records))
    }

    /// 分工种 PPC (可选限定某周)
    pub fn by_trade(&self, project_id: &str, week_start: Option<NaiveDate>) -> ApiResult<Vec<TradePpc>> {
        require_non_empty("project_id", project_id)?;
        let ledger = self.commitment_repo.list_by_project(project_id)?;
        Ok(self.calculator.trade_ppc(project_id, week_start, &ledger))
    }

    /// 逐周未完成统计
    pub fn variance_history(&self, project_id: &str) -> ApiResult<Vec<VarianceWeek>> {
        require_non_empty("project_id", project_id)?;
        let ledger = self.commitment_repo.list_by_project(project_id)?;
        Ok(self.calculator.variance_history(project_id, &ledger))
    }

    /// 未完成原因排名 (可选限定某周)
    pub fn variance_reasons(
        &self,
        project_id: &str,
        week_start: Option<NaiveDate>,
    ) -> ApiResult<Vec<VarianceReasonCount>> {
        require_non_empty("project_id", project_id)?;
        let ledger = self.commitment_repo.list_by_project(project_id)?;
        Ok(self.calculator.variance_reasons(project_id, week_start, &ledger))
    }
}
