// ==========================================
// 节拍排程内核 - 按键互斥锁
// ==========================================
// 同一键上的写操作串行执行, 不同键互不阻塞
// 用法: PPC 计算按 (project, week); 流水线按 plan; 日志按 (project, date)
// ==========================================

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

// ===== 锁键 =====

/// PPC 计算与承诺补丁共用
pub fn week_key(project_id: &str, week_start: NaiveDate) -> String {
    format!("week:{}:{}", project_id, week_start)
}

pub fn plan_key(plan_id: &str) -> String {
    format!("plan:{}", plan_id)
}

pub fn assignment_key(assignment_id: &str) -> String {
    format!("assignment:{}", assignment_id)
}

pub fn daily_log_key(project_id: &str, log_date: NaiveDate) -> String {
    format!("daily_log:{}:{}", project_id, log_date)
}

#[derive(Debug, Default)]
pub struct KeyedLock {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

// 离开独占区时回收键 (含 panic 展开)
struct ReleaseOnDrop<'a> {
    owner: &'a KeyedLock,
    key: &'a str,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.owner.release(self.key);
    }
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// 持有 `key` 的独占区执行 `f`
    ///
    /// 槽位只保护 `()`, 前一持有者 panic 造成的中毒直接忽略
    pub fn with_key<T, E, F>(&self, key: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // 声明顺序决定析构顺序: guard → slot → 回收
        let _release = ReleaseOnDrop { owner: self, key };
        let slot = self.slot(key);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// 当前登记的键数 (诊断用)
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }

    // 无其他持有者时回收键
    fn release(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            slots.remove(key);
        }
    }
}
