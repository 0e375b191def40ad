//! 任务引擎：ID 分配、任务创建与状态查询的入口
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::completion::CompletionState;
use crate::error::ConfigError;
use crate::options::EngineOptions;
use crate::paths::PathResolver;
use crate::registry::TaskRegistry;
use crate::signatures::SignatureTable;
use crate::task::{ScanContext, ScanTask};
use crate::types::{CreatedTask, TaskId, TaskStatus};

/// 登记表为空时 `list_statuses` 返回的占位行
pub const NO_TASKS_MESSAGE: &str = "No tasks created yet.";

pub struct TaskEngine {
    ctx: ScanContext,
    registry: TaskRegistry,
    next_id: AtomicU64,
}

impl TaskEngine {
    /// 构建特征表与扫描线程池
    pub fn new(opts: &EngineOptions) -> Result<Self, ConfigError> {
        if opts.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        let threads = opts.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("scan-unit-{i}"))
            // 单元 panic 时其发送端随栈展开被丢弃，由汇合线程记为汇合错误
            .panic_handler(|_| error!("scan unit panicked"))
            .build()?;
        let resolver = PathResolver::new(opts.effective_home_dir(), opts.follow_links)?;
        debug!(threads, first_id = opts.first_id, "scan engine ready");

        Ok(Self {
            ctx: ScanContext {
                signatures: Arc::new(SignatureTable::builtin()),
                pool: Arc::new(pool),
                resolver: Arc::new(resolver),
            },
            registry: TaskRegistry::new(),
            next_id: AtomicU64::new(opts.first_id),
        })
    }

    fn allocate_id(&self) -> TaskId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// 创建扫描任务并立即返回；构造期错误同样分配 ID 并登记
    pub fn create_task(&self, path: &str) -> CreatedTask {
        let id = self.allocate_id();
        let task = ScanTask::create(id, path, &self.ctx);
        let error = match task.completion_state() {
            CompletionState::Faulted(err) => Some(err.to_string()),
            _ => None,
        };
        self.registry.insert(task);
        CreatedTask { id, error }
    }

    pub fn task(&self, id: TaskId) -> Option<Arc<ScanTask>> {
        self.registry.get(id)
    }

    pub fn task_status(&self, id: TaskId) -> Option<TaskStatus> {
        self.registry.get(id).map(|t| t.status())
    }

    /// 单个任务的状态文本；不存在时给出提示
    pub fn status_of(&self, id: TaskId) -> String {
        match self.registry.get(id) {
            Some(task) => task.render_status(),
            None => format!("Could not find task with id={id}"),
        }
    }

    /// 所有任务的状态文本
    pub fn list_statuses(&self) -> Vec<String> {
        let tasks = self.registry.list();
        if tasks.is_empty() {
            return vec![NO_TASKS_MESSAGE.to_string()];
        }
        tasks.iter().map(|t| t.render_status()).collect()
    }

    /// 阻塞等待指定任务进入终态
    pub fn wait(&self, id: TaskId) -> Option<TaskStatus> {
        self.registry.get(id).map(|t| t.wait())
    }

    pub fn task_count(&self) -> usize {
        self.registry.len()
    }
}
