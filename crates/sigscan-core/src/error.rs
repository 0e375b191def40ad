//! 错误类型
use std::path::PathBuf;
use thiserror::Error;

/// 任务级错误（构造期校验、目录枚举、汇合阶段）
///
/// 单文件的打开/读取失败不会出现在这里，它们只计入 `io_errors`。
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Can't scan empty path")]
    EmptyPath,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("home directory is unknown, can't expand {0}")]
    HomeDirUnknown(String),

    #[error("failed to enumerate {}: {source}", .path.display())]
    Enumerate {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to start scan orchestration: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{lost} of {expected} scan units terminated without reporting")]
    UnitsLost { expected: usize, lost: usize },
}

impl ScanError {
    /// 是否为构造期错误（任务从未开始扫描）
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            ScanError::EmptyPath
                | ScanError::InvalidPath(_)
                | ScanError::HomeDirUnknown(_)
                | ScanError::Enumerate { .. }
        )
    }
}

/// 引擎启动与配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("invalid path pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
