//! 公共类型（对外暴露）
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::stats::StatsSnapshot;

/// 任务标识（进程内唯一、单调递增）
pub type TaskId = u64;

/// 任务状态视图
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending { id: TaskId },
    Faulted { id: TaskId, error: String },
    Succeeded { id: TaskId, stats: StatsSnapshot, exec_time: Duration },
}

impl TaskStatus {
    pub fn id(&self) -> TaskId {
        match self {
            TaskStatus::Pending { id } | TaskStatus::Faulted { id, .. } | TaskStatus::Succeeded { id, .. } => *id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending { .. })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending { id } => write!(f, "Scan #{id} is not yet completed"),
            TaskStatus::Faulted { id, error } => write!(f, "Task #{id} was halted due to error: {error}"),
            TaskStatus::Succeeded { id, stats, exec_time } => {
                writeln!(f, "====== Scan #{id} result ======")?;
                writeln!(f, "Processed files: {}", stats.total_processed)?;
                writeln!(f, "JS detects: {}", stats.script_injection_hits)?;
                writeln!(f, "rm -rf detects: {}", stats.destructive_command_hits)?;
                writeln!(f, "Rundll detects: {}", stats.malicious_loader_hits)?;
                writeln!(f, "Errors: {}", stats.io_errors)?;
                writeln!(f, "Execution time: {exec_time:?}")?;
                write!(f, "==============================")
            }
        }
    }
}

/// 创建请求的结果：ID 总会分配，构造期错误随之返回
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedTask {
    pub id: TaskId,
    pub error: Option<String>,
}

impl fmt::Display for CreatedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "Task {} successfully created.", self.id),
            Some(err) => write!(f, "Task {} was not created due to error: {err}", self.id),
        }
    }
}
