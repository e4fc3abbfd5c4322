// ==========================================
// 节拍排程内核 - 流水线 API
// ==========================================
// 职责: 生成 / 查询 / 删除流水线, 缓冲与堆叠分析, 进度上报与叠加
// 红线: 同一 plan 的生成/删除串行; 同一 assignment 的进度上报串行
// 红线: 删除幂等; 重新生成或删除时清空该 plan 的进度
// 锁序: plan → assignment
// ==========================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_non_empty;
use crate::domain::plan::{BufferEntry, FlowlineData, FlowlineSummary, StackingConflict, Trade, Zone};
use crate::domain::progress::{ProgressRecord, ProgressUpdate};
use crate::domain::types::ProjectType;
use crate::engine::{
    BufferAnalyzer, DependencyGraphEngine, FlowlineGenerator, ProgressTracker, RelationshipLibrary,
};
use crate::repository::key_lock::{assignment_key, plan_key};
use crate::repository::{FlowlineRepository, KeyedLock, ProgressRepository};

// ==========================================
// 请求 DTO
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFlowlineRequest {
    pub plan_id: String,
    pub zones: Vec<Zone>,
    pub trades: Vec<Trade>,
    pub takt_time: u32,
    #[serde(default)]
    pub buffer_size: u32,
    /// 显式 today 游标; 为空时按比例计算
    #[serde(default)]
    pub today_x: Option<f64>,
    /// 生成前按关系库对工种做依赖排序 (宽松模式)
    #[serde(default)]
    pub sequence_by_dependencies: bool,
    #[serde(default)]
    pub project_type: ProjectType,
}

// ==========================================
// FlowlineApi
// ==========================================
pub struct FlowlineApi {
    flowline_repo: Arc<dyn FlowlineRepository>,
    progress_repo: Arc<dyn ProgressRepository>,
    locks: Arc<KeyedLock>,
    generator: FlowlineGenerator,
    analyzer: BufferAnalyzer,
    tracker: ProgressTracker,
    library: RelationshipLibrary,
    graph: DependencyGraphEngine,
}

impl FlowlineApi {
    pub fn new(
        flowline_repo: Arc<dyn FlowlineRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
        locks: Arc<KeyedLock>,
        generator: FlowlineGenerator,
        analyzer: BufferAnalyzer,
    ) -> Self {
        Self {
            flowline_repo,
            progress_repo,
            locks,
            generator,
            analyzer,
            tracker: ProgressTracker::new(),
            library: RelationshipLibrary::new(),
            graph: DependencyGraphEngine::new(),
        }
    }

    /// 按依赖关系重排工种 (有环时保持原顺序)
    fn sequence(&self, trades: Vec<Trade>, project_type: ProjectType) -> Vec<Trade> {
        let codes: Vec<String> = trades.iter().map(|t| t.code.clone()).collect();
        let relationships = self.library.templates_for_trades(&codes, project_type);
        let order = self.graph.topological_sort(&codes, &relationships);

        // 同代码多工种时按原相对顺序依次取出
        let mut buckets: HashMap<String, Vec<Trade>> = HashMap::new();
        for t in trades.into_iter().rev() {
            buckets.entry(t.code.clone()).or_default().push(t);
        }
        let mut sequenced = Vec::with_capacity(order.len());
        for code in &order {
            if let Some(t) = buckets.get_mut(code).and_then(|b| b.pop()) {
                sequenced.push(t);
            }
        }
        sequenced
    }

    /// 生成并保存流水线 (同一 plan 整体替换)
    pub fn generate(&self, request: GenerateFlowlineRequest) -> ApiResult<FlowlineData> {
        require_non_empty("plan_id", &request.plan_id)?;
        for t in &request.trades {
            require_non_empty("trade.id", &t.id)?;
            require_non_empty("trade.code", &t.code)?;
        }
        for z in &request.zones {
            require_non_empty("zone.id", &z.id)?;
        }

        let GenerateFlowlineRequest {
            plan_id,
            zones,
            trades,
            takt_time,
            buffer_size,
            today_x,
            sequence_by_dependencies,
            project_type,
        } = request;

        let trades = if sequence_by_dependencies {
            self.sequence(trades, project_type)
        } else {
            trades
        };

        let flowline = match today_x {
            Some(x) => self
                .generator
                .compute_flowline_at(&plan_id, &zones, &trades, takt_time, buffer_size, x)?,
            None => self
                .generator
                .compute_flowline(&plan_id, &zones, &trades, takt_time, buffer_size)?,
        };

        self.locks.with_key(&plan_key(&plan_id), || -> ApiResult<()> {
            self.flowline_repo.put(&flowline)?;
            self.clear_progress(&plan_id)
        })?;

        info!(plan_id = %plan_id, wagons = flowline.wagons.len(), "流水线已保存");
        Ok(flowline)
    }

    /// 查询流水线
    pub fn get(&self, plan_id: &str) -> ApiResult<FlowlineData> {
        require_non_empty("plan_id", plan_id)?;
        self.flowline_repo
            .get(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("流水线(plan_id={})不存在", plan_id)))
    }

    /// 删除流水线 (幂等)
    ///
    /// # 返回
    /// - Ok(true): 已删除; Ok(false): 原本不存在
    pub fn delete(&self, plan_id: &str) -> ApiResult<bool> {
        require_non_empty("plan_id", plan_id)?;
        let removed = self.locks.with_key(&plan_key(plan_id), || -> ApiResult<bool> {
            let removed = self.flowline_repo.delete(plan_id)?;
            self.clear_progress(plan_id)?;
            Ok(removed)
        })?;
        info!(plan_id = %plan_id, removed = removed, "流水线删除");
        Ok(removed)
    }

    // 调用方须已持有 plan 锁
    fn clear_progress(&self, plan_id: &str) -> ApiResult<()> {
        let cleared = self.locks.with_key(&assignment_key(plan_id), || {
            self.progress_repo.delete_by_assignment(plan_id)
        })?;
        if cleared > 0 {
            info!(plan_id = %plan_id, cleared = cleared, "旧进度已清除");
        }
        Ok(())
    }

    pub fn buffers(&self, plan_id: &str) -> ApiResult<Vec<BufferEntry>> {
        let flowline = self.get(plan_id)?;
        Ok(self.analyzer.compute_buffers(&flowline))
    }

    pub fn stacking(&self, plan_id: &str) -> ApiResult<Vec<StackingConflict>> {
        let flowline = self.get(plan_id)?;
        Ok(self.generator.detect_trade_stacking(&flowline))
    }

    pub fn summary(&self, plan_id: &str) -> ApiResult<FlowlineSummary> {
        let flowline = self.get(plan_id)?;
        Ok(self.generator.summarize(&flowline))
    }

    /// 上报作业进度
    pub fn record_progress(&self, update: ProgressUpdate) -> ApiResult<ProgressRecord> {
        require_non_empty("assignment_id", &update.assignment_id)?;
        require_non_empty("zone_id", &update.zone_id)?;
        require_non_empty("trade_id", &update.trade_id)?;

        self.locks.with_key(&assignment_key(&update.assignment_id), || -> ApiResult<ProgressRecord> {
            let current = self
                .progress_repo
                .get(&update.assignment_id, &update.zone_id, &update.trade_id)?;
            let record = self
                .tracker
                .apply(current, &update, Utc::now().naive_utc())
                .map_err(|e| {
                    warn!(assignment_id = %update.assignment_id, error = %e, "进度上报被拒绝");
                    ApiError::from(e)
                })?;
            self.progress_repo.put(&record)?;
            Ok(record)
        })
    }

    pub fn list_progress(&self, assignment_id: &str) -> ApiResult<Vec<ProgressRecord>> {
        require_non_empty("assignment_id", assignment_id)?;
        Ok(self.progress_repo.list_by_assignment(assignment_id)?)
    }

    /// 叠加进度后的流水线 (assignment_id 即 plan_id)
    pub fn flowline_with_progress(&self, plan_id: &str) -> ApiResult<FlowlineData> {
        let flowline = self.get(plan_id)?;
        let records = self.progress_repo.list_by_assignment(plan_id)?;
        Ok(self.tracker.overlay(&flowline, &records))
    }
}
