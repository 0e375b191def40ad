//! 扫描任务：构造期解析路径，后台并行调度扫描单元并汇合
//!
//! 调度方式：
//! - 构造时立即解析出文件列表，失败则任务直接进入 Faulted，不做任何扫描
//! - 每个文件一个扫描单元，全部立即提交到共享 Rayon 线程池
//! - 独立的汇合线程通过 crossbeam 通道收齐每个单元的结果后才写入终态
use crossbeam_channel as channel;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::completion::{Completion, CompletionState};
use crate::error::ScanError;
use crate::paths::PathResolver;
use crate::signatures::SignatureTable;
use crate::stats::{ScanCounters, StatsSnapshot};
use crate::types::{TaskId, TaskStatus};
use crate::unit::{self, UnitOutcome};

/// 单元 → 汇合线程的通道容量
const UNIT_CHANNEL_CAP: usize = 256;

/// 所有任务共享的只读资源
#[derive(Clone)]
pub(crate) struct ScanContext {
    pub(crate) signatures: Arc<SignatureTable>,
    pub(crate) pool: Arc<rayon::ThreadPool>,
    pub(crate) resolver: Arc<PathResolver>,
}

/// 一次扫描请求
#[derive(Debug)]
pub struct ScanTask {
    id: TaskId,
    files: Vec<PathBuf>,
    counters: ScanCounters,
    started_at: Option<Instant>,
    exec_time: OnceLock<Duration>,
    completion: Completion,
}

/// 汇合阶段收到的单元结果汇总（仅用于日志）
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct JoinSummary {
    pub(crate) finished: usize,
    pub(crate) detected: usize,
    pub(crate) failed: usize,
}

impl JoinSummary {
    fn add(&mut self, outcome: UnitOutcome) {
        self.finished += 1;
        match outcome {
            UnitOutcome::Detected(_) => self.detected += 1,
            UnitOutcome::Failed => self.failed += 1,
            UnitOutcome::Clean => {}
        }
    }
}

impl ScanTask {
    fn new(id: TaskId, files: Vec<PathBuf>, started_at: Option<Instant>) -> Self {
        Self {
            id,
            files,
            counters: ScanCounters::new(),
            started_at,
            exec_time: OnceLock::new(),
            completion: Completion::new(),
        }
    }

    /// 创建任务并立即在后台开始扫描；不等待扫描结束
    pub(crate) fn create(id: TaskId, source: &str, ctx: &ScanContext) -> Arc<Self> {
        let files = match ctx.resolver.resolve(source) {
            Ok(files) => files,
            Err(err) => {
                warn!(task = id, source, error = %err, "scan task rejected");
                let task = Self::new(id, Vec::new(), None);
                task.completion.fault(err);
                return Arc::new(task);
            }
        };

        let task = Arc::new(Self::new(id, files, Some(Instant::now())));
        info!(task = id, source, files = task.files.len(), "scan task created and started execution");
        task.launch(ctx);
        task
    }

    fn launch(self: &Arc<Self>, ctx: &ScanContext) {
        let task = Arc::clone(self);
        let ctx = ctx.clone();
        let spawned = thread::Builder::new()
            .name(format!("scan-task-{}", self.id))
            .spawn(move || task.run(&ctx));
        if let Err(err) = spawned {
            self.abort(ScanError::Spawn(err));
        }
    }

    // 汇合线程主体
    fn run(self: Arc<Self>, ctx: &ScanContext) {
        let (tx, rx) = channel::bounded::<UnitOutcome>(UNIT_CHANNEL_CAP);
        for idx in 0..self.files.len() {
            let task = Arc::clone(&self);
            let signatures = Arc::clone(&ctx.signatures);
            let tx = tx.clone();
            ctx.pool.spawn(move || {
                let outcome = unit::scan_file(&task.files[idx], &signatures, &task.counters);
                let _ = tx.send(outcome);
            });
        }
        // 只剩单元持有发送端，单元异常退出时接收端才能感知断开
        drop(tx);

        match join_units(&rx, self.files.len()) {
            Ok(summary) => {
                let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
                let _ = self.exec_time.set(elapsed);
                if self.completion.succeed() {
                    info!(
                        task = self.id,
                        files = summary.finished,
                        detected = summary.detected,
                        failed = summary.failed,
                        ?elapsed,
                        "scan task finished"
                    );
                } else {
                    warn!(task = self.id, "scan task already settled, result dropped");
                }
            }
            Err(err) => self.abort(err),
        }
    }

    // 编排层错误：额外计一次 io 错误并进入 Faulted
    fn abort(&self, err: ScanError) {
        error!(task = self.id, error = %err, "scan task halted");
        self.counters.record_io_error();
        if !self.completion.fault(err) {
            warn!(task = self.id, "scan task already settled, error dropped");
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.counters.snapshot()
    }

    /// 仅在正常完成后可用
    pub fn exec_time(&self) -> Option<Duration> {
        self.exec_time.get().copied()
    }

    pub fn completion_state(&self) -> CompletionState {
        self.completion.state()
    }

    /// 当前状态视图（无副作用，可重复调用）
    pub fn status(&self) -> TaskStatus {
        status_from(self.id, self.completion.state(), self)
    }

    /// 阻塞直到任务进入终态
    pub fn wait(&self) -> TaskStatus {
        let state = self.completion.wait();
        status_from(self.id, state, self)
    }

    /// 渲染状态文本
    pub fn render_status(&self) -> String {
        self.status().to_string()
    }
}

fn status_from(id: TaskId, state: CompletionState, task: &ScanTask) -> TaskStatus {
    match state {
        CompletionState::Pending => TaskStatus::Pending { id },
        CompletionState::Faulted(err) => TaskStatus::Faulted { id, error: err.to_string() },
        CompletionState::Succeeded => TaskStatus::Succeeded {
            id,
            stats: task.snapshot(),
            exec_time: task.exec_time().unwrap_or_default(),
        },
    }
}

/// 收齐 `expected` 个单元结果；发送端全部断开但数量不足即为汇合错误
pub(crate) fn join_units(
    rx: &channel::Receiver<UnitOutcome>,
    expected: usize,
) -> Result<JoinSummary, ScanError> {
    let mut summary = JoinSummary::default();
    while summary.finished < expected {
        match rx.recv() {
            Ok(outcome) => summary.add(outcome),
            Err(_) => {
                return Err(ScanError::UnitsLost { expected, lost: expected - summary.finished });
            }
        }
    }
    Ok(summary)
}
