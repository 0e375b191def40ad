//! 引擎选项
use serde::Deserialize;
use std::path::PathBuf;

/// 第一个任务 ID，之后逐个递增
pub const DEFAULT_FIRST_ID: u64 = 1234;

/// 引擎选项（可由 TOML 的 `[engine]` 表加载，见 `config.rs`）
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// 扫描线程池宽度：None 表示自动（等于 CPU 核数）
    pub threads: Option<usize>,
    /// 任务 ID 计数器的起始值
    pub first_id: u64,
    /// 枚举目录时是否跟随符号链接
    pub follow_links: bool,
    /// 替换 `%userprofile%` 时使用的主目录；None 表示取当前用户主目录
    pub home_dir: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            threads: None,
            first_id: DEFAULT_FIRST_ID,
            follow_links: false,
            home_dir: None,
        }
    }
}

impl EngineOptions {
    /// 实际使用的线程数
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    /// 实际使用的主目录
    pub fn effective_home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone().or_else(dirs::home_dir)
    }
}
