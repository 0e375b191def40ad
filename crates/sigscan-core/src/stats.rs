//! 扫描统计：原子计数器与快照
//!
//! 计数器只增不减，全部使用 `Relaxed` 自增；各计数器之间没有顺序约束，
//! 完成信号发出前所有扫描单元均已结束（见 `task.rs`），因此终态快照是完整的。
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::signatures::DetectionKind;

/// 单个任务的共享计数器
#[derive(Debug, Default)]
pub struct ScanCounters {
    total_processed: AtomicU64,
    script_injection: AtomicU64,
    destructive_command: AtomicU64,
    malicious_loader: AtomicU64,
    io_errors: AtomicU64,
}

impl ScanCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 成功打开一个文件
    pub fn record_opened(&self) {
        self.total_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection(&self, kind: DetectionKind) {
        let counter = match kind {
            DetectionKind::ScriptInjection => &self.script_injection,
            DetectionKind::DestructiveCommand => &self.destructive_command,
            DetectionKind::MaliciousLoader => &self.malicious_loader,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_processed: self.total_processed.load(Ordering::Relaxed),
            script_injection_hits: self.script_injection.load(Ordering::Relaxed),
            destructive_command_hits: self.destructive_command.load(Ordering::Relaxed),
            malicious_loader_hits: self.malicious_loader.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }
}

/// 计数器的某一时刻视图
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_processed: u64,
    pub script_injection_hits: u64,
    pub destructive_command_hits: u64,
    pub malicious_loader_hits: u64,
    pub io_errors: u64,
}

impl StatsSnapshot {
    pub fn hits(&self, kind: DetectionKind) -> u64 {
        match kind {
            DetectionKind::ScriptInjection => self.script_injection_hits,
            DetectionKind::DestructiveCommand => self.destructive_command_hits,
            DetectionKind::MaliciousLoader => self.malicious_loader_hits,
        }
    }

    /// 三类检出之和
    pub fn total_hits(&self) -> u64 {
        DetectionKind::ALL.iter().map(|k| self.hits(*k)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(ScanCounters::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_detection_routes_to_its_counter() {
        let c = ScanCounters::new();
        c.record_detection(DetectionKind::DestructiveCommand);
        c.record_detection(DetectionKind::DestructiveCommand);
        c.record_detection(DetectionKind::MaliciousLoader);
        let s = c.snapshot();
        assert_eq!(s.script_injection_hits, 0);
        assert_eq!(s.destructive_command_hits, 2);
        assert_eq!(s.malicious_loader_hits, 1);
        assert_eq!(s.total_hits(), 3);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let c = Arc::new(ScanCounters::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        c.record_opened();
                        c.record_io_error();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let s = c.snapshot();
        assert_eq!(s.total_processed, 8000);
        assert_eq!(s.io_errors, 8000);
    }
}
