//! 特征扫描任务引擎
//!
//! 设计要点：
//! - 一个路径对应一个扫描任务；任务在创建时解析出文件列表，随后在后台为每个文件提交一个扫描单元。
//! - 单元之间只共享只读特征表与任务内的原子计数器，单文件失败只计数，不影响其它单元。
//! - 任务通过单次赋值的完成信号对外暴露 Pending / Faulted / Succeeded 三种状态。

mod completion;
mod config;
mod engine;
mod error;
mod options;
mod paths;
mod registry;
mod signatures;
mod stats;
mod task;
mod types;
mod unit;

pub use completion::CompletionState;
pub use config::load_options;
pub use engine::{TaskEngine, NO_TASKS_MESSAGE};
pub use error::{ConfigError, ScanError};
pub use options::{EngineOptions, DEFAULT_FIRST_ID};
pub use paths::HOME_PLACEHOLDER;
pub use registry::TaskRegistry;
pub use signatures::{DetectionKind, SignatureTable};
pub use stats::{ScanCounters, StatsSnapshot};
pub use task::ScanTask;
pub use types::{CreatedTask, TaskId, TaskStatus};
pub use unit::{scan_file, UnitOutcome};
