//! 任务登记表：按 ID 存放所有创建过的任务，支持并发插入与查询
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::task::ScanTask;
use crate::types::TaskId;

#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, Arc<ScanTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: Arc<ScanTask>) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        tasks.insert(task.id(), task);
    }

    pub fn get(&self, id: TaskId) -> Option<Arc<ScanTask>> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.get(&id).cloned()
    }

    /// 全部任务，按 ID 升序
    pub fn list(&self) -> Vec<Arc<ScanTask>> {
        let mut all: Vec<Arc<ScanTask>> = {
            let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
            tasks.values().cloned().collect()
        };
        all.sort_by_key(|t| t.id());
        all
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
