// ==========================================
// 节拍排程内核 - 依赖图引擎
// ==========================================
// 职责: 环检测 + 拓扑排序
// 输入: 工种代码集合 + 关系模板
// 输出: 满足全部前驱在前的工种顺序
// ==========================================
// 红线: 宽松排序遇环时原样返回输入顺序,不报错、不输出部分顺序
// 红线: 环检测使用显式栈,不依赖递归深度
// ==========================================

use std::collections::{BTreeSet, HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::relationship::ActivityRelationshipTemplate;

/// 依赖图错误 (仅严格模式对外暴露)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("依赖图存在环: {}", nodes.join(", "))]
    CycleDetected { nodes: Vec<String> },

    #[error("工种代码重复: {0}")]
    DuplicateTradeCode(String),
}

const WHITE: u8 = 0;
const GRAY: u8 = 1;
const BLACK: u8 = 2;

/// 为节点分配稠密下标 (首次出现顺序)
fn intern<'a>(
    code: &'a str,
    index: &mut HashMap<&'a str, usize>,
    nodes: &mut Vec<&'a str>,
    adj: &mut Vec<Vec<usize>>,
) -> usize {
    if let Some(&i) = index.get(code) {
        return i;
    }
    nodes.push(code);
    adj.push(Vec::new());
    index.insert(code, nodes.len() - 1);
    nodes.len() - 1
}

// ==========================================
// DependencyGraphEngine - 依赖图引擎
// ==========================================
// 无状态引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct DependencyGraphEngine;

impl DependencyGraphEngine {
    pub fn new() -> Self {
        Self
    }

    /// 环检测
    ///
    /// 深度优先遍历,遇到指向"当前栈中"节点的回边即记录该环上的全部节点
    ///
    /// # 返回
    /// 位于环上的工种代码集合; 无环时为空
    pub fn detect_cycles(&self, relationships: &[ActivityRelationshipTemplate]) -> BTreeSet<String> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut nodes: Vec<&str> = Vec::new();
        let mut adj: Vec<Vec<usize>> = Vec::new();

        for r in relationships {
            let p = intern(r.predecessor_code.as_str(), &mut index, &mut nodes, &mut adj);
            let s = intern(r.successor_code.as_str(), &mut index, &mut nodes, &mut adj);
            adj[p].push(s);
        }

        let mut color = vec![WHITE; nodes.len()];
        let mut on_cycle: BTreeSet<String> = BTreeSet::new();

        for start in 0..nodes.len() {
            if color[start] != WHITE {
                continue;
            }

            // (节点, 下一条待访问出边下标)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            color[start] = GRAY;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.1 < adj[node].len() {
                    let target = adj[node][frame.1];
                    frame.1 += 1;

                    match color[target] {
                        WHITE => {
                            color[target] = GRAY;
                            stack.push((target, 0));
                        }
                        GRAY => {
                            // 回边: 栈中从 target 到当前节点即为一个环
                            if let Some(pos) = stack.iter().position(|(n, _)| *n == target) {
                                for (n, _) in &stack[pos..] {
                                    on_cycle.insert(nodes[*n].to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                } else {
                    color[node] = BLACK;
                    stack.pop();
                }
            }
        }

        if !on_cycle.is_empty() {
            debug!(cycle_nodes = ?on_cycle, "检测到依赖环");
        }

        on_cycle
    }

    /// Kahn 算法
    ///
    /// 只考虑两端都在 `trade_codes` 中的边; 队列按输入顺序初始化,输出确定
    fn kahn<S: AsRef<str>>(
        &self,
        trade_codes: &[S],
        relationships: &[ActivityRelationshipTemplate],
    ) -> Vec<String> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut nodes: Vec<&str> = Vec::new();
        for code in trade_codes {
            let code = code.as_ref();
            if !index.contains_key(code) {
                index.insert(code, nodes.len());
                nodes.push(code);
            }
        }

        let mut in_degree = vec![0usize; nodes.len()];
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for r in relationships {
            let (Some(&p), Some(&s)) = (
                index.get(r.predecessor_code.as_str()),
                index.get(r.successor_code.as_str()),
            ) else {
                continue;
            };
            adj[p].push(s);
            in_degree[s] += 1;
        }

        let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(nodes.len());

        while let Some(node) = queue.pop_front() {
            order.push(nodes[node].to_string());
            for &next in &adj[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        order
    }

    /// 拓扑排序 (宽松模式, 与历史行为一致)
    ///
    /// 输出数量少于输入数量 (存在环) 时,原样返回输入顺序
    pub fn topological_sort<S: AsRef<str>>(
        &self,
        trade_codes: &[S],
        relationships: &[ActivityRelationshipTemplate],
    ) -> Vec<String> {
        let order = self.kahn(trade_codes, relationships);

        if order.len() < trade_codes.len() {
            warn!(
                input_count = trade_codes.len(),
                emitted_count = order.len(),
                "拓扑排序未能覆盖全部工种,回退为输入顺序"
            );
            return trade_codes.iter().map(|c| c.as_ref().to_string()).collect();
        }

        order
    }

    /// 拓扑排序 (严格模式)
    ///
    /// 存在环时返回 `GraphError::CycleDetected`
    pub fn topological_sort_strict<S: AsRef<str>>(
        &self,
        trade_codes: &[S],
        relationships: &[ActivityRelationshipTemplate],
    ) -> Result<Vec<String>, GraphError> {
        let mut seen = BTreeSet::new();
        for code in trade_codes {
            if !seen.insert(code.as_ref()) {
                return Err(GraphError::DuplicateTradeCode(code.as_ref().to_string()));
            }
        }

        let order = self.kahn(trade_codes, relationships);
        if order.len() < trade_codes.len() {
            let active: Vec<ActivityRelationshipTemplate> = relationships
                .iter()
                .filter(|r| {
                    seen.contains(r.predecessor_code.as_str()) && seen.contains(r.successor_code.as_str())
                })
                .cloned()
                .collect();
            let nodes = self.detect_cycles(&active).into_iter().collect();
            return Err(GraphError::CycleDetected { nodes });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RelationshipType;

    fn fs(p: &str, s: &str) -> ActivityRelationshipTemplate {
        ActivityRelationshipTemplate::finish_to_start(p, s, 0)
    }

    fn position(order: &[String], code: &str) -> usize {
        order.iter().position(|c| c == code).unwrap()
    }

    /// 确定性构造的 DAG: 只允许 i → j (i < j)
    fn synthetic_dag(n: usize) -> (Vec<String>, Vec<ActivityRelationshipTemplate>) {
        let codes: Vec<String> = (0..n).map(|i| format!("T{:03}", i)).collect();
        let mut rels = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if (i * 7 + j * 3) % 5 == 0 {
                    rels.push(fs(&codes[i], &codes[j]));
                }
            }
        }
        // 打乱输入顺序: 固定步长置换
        let mut shuffled = Vec::with_capacity(n);
        let step = 37 % n.max(1);
        let mut k = 0;
        for _ in 0..n {
            shuffled.push(codes[k].clone());
            k = (k + step.max(1)) % n;
        }
        (shuffled, rels)
    }

    #[test]
    fn test_topological_sort_respects_every_edge() {
        let engine = DependencyGraphEngine::new();
        for n in [5usize, 12, 40, 64] {
            let (codes, rels) = synthetic_dag(n);
            if codes.iter().collect::<BTreeSet<_>>().len() != n {
                continue; // 步长与 n 不互素时置换不完整,跳过
            }
            let order = engine.topological_sort(&codes, &rels);
            assert_eq!(order.len(), n);
            for r in &rels {
                assert!(
                    position(&order, &r.predecessor_code) < position(&order, &r.successor_code),
                    "{} 应在 {} 之前",
                    r.predecessor_code,
                    r.successor_code
                );
            }
        }
    }

    #[test]
    fn test_topological_sort_is_stable_for_independent_nodes() {
        let engine = DependencyGraphEngine::new();
        let codes = vec!["C", "A", "B"];
        let order = engine.topological_sort(&codes, &[]);
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_cycle_returns_original_input_order() {
        let engine = DependencyGraphEngine::new();
        let codes = vec!["DRYWALL", "SLABS", "PAINTING", "HVAC_ROUGH_IN"];
        let rels = vec![
            fs("SLABS", "HVAC_ROUGH_IN"),
            fs("HVAC_ROUGH_IN", "DRYWALL"),
            fs("DRYWALL", "PAINTING"),
            fs("PAINTING", "HVAC_ROUGH_IN"),
        ];

        let order = engine.topological_sort(&codes, &rels);
        assert_eq!(order, codes);

        let cycle = engine.detect_cycles(&rels);
        assert!(!cycle.is_empty());
        assert!(cycle.contains("HVAC_ROUGH_IN"));
        assert!(cycle.contains("DRYWALL"));
        assert!(cycle.contains("PAINTING"));
        assert!(!cycle.contains("SLABS"));
    }

    #[test]
    fn test_strict_sort_reports_cycle_nodes() {
        let engine = DependencyGraphEngine::new();
        let codes = vec!["A", "B", "C"];
        let rels = vec![fs("A", "B"), fs("B", "C"), fs("C", "A")];

        match engine.topological_sort_strict(&codes, &rels) {
            Err(GraphError::CycleDetected { nodes }) => {
                assert_eq!(nodes, vec!["A", "B", "C"]);
            }
            other => panic!("Expected CycleDetected, got {:?}", other),
        }

        let ok = engine.topological_sort_strict(&codes, &rels[..2]).unwrap();
        assert_eq!(ok, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_strict_sort_rejects_duplicates() {
        let engine = DependencyGraphEngine::new();
        let result = engine.topological_sort_strict(&["A", "B", "A"], &[]);
        assert_eq!(result, Err(GraphError::DuplicateTradeCode("A".to_string())));
        // 宽松模式: 输出数量不足,按约定原样返回
        assert_eq!(engine.topological_sort(&["A", "B", "A"], &[]), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_edges_to_absent_trades_are_ignored() {
        let engine = DependencyGraphEngine::new();
        let rels = vec![fs("X", "B"), fs("B", "A"), fs("A", "Y")];
        let order = engine.topological_sort(&["A", "B"], &rels);
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let engine = DependencyGraphEngine::new();
        let rels = vec![fs("A", "A").with_type(RelationshipType::StartToStart)];
        let cycle = engine.detect_cycles(&rels);
        assert_eq!(cycle.into_iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_detect_cycles_handles_long_chains_without_recursion() {
        let engine = DependencyGraphEngine::new();
        let n = 5_000;
        let mut rels: Vec<ActivityRelationshipTemplate> = (0..n - 1)
            .map(|i| fs(&format!("N{}", i), &format!("N{}", i + 1)))
            .collect();
        assert!(engine.detect_cycles(&rels).is_empty());

        rels.push(fs(&format!("N{}", n - 1), "N0"));
        let cycle = engine.detect_cycles(&rels);
        assert_eq!(cycle.len(), n);
    }
}
