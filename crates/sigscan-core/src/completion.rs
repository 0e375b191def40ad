//! 单次赋值的完成信号：Pending → Faulted | Succeeded
//!
//! 构造期校验与后台汇合都可能尝试写入终态，先写者生效，后写者得到 `false`。
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::ScanError;

/// 完成信号的可观察状态
#[derive(Debug, Clone)]
pub enum CompletionState {
    Pending,
    Faulted(Arc<ScanError>),
    Succeeded,
}

impl CompletionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CompletionState::Pending)
    }
}

#[derive(Debug)]
pub struct Completion {
    state: Mutex<CompletionState>,
    cond: Condvar,
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl Completion {
    pub fn new() -> Self {
        Self { state: Mutex::new(CompletionState::Pending), cond: Condvar::new() }
    }

    // 锁内只有一次赋值，不会留下半写状态，中毒时直接取回内部值
    fn lock(&self) -> MutexGuard<'_, CompletionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, next: CompletionState) -> bool {
        let mut state = self.lock();
        if state.is_terminal() {
            return false;
        }
        *state = next;
        self.cond.notify_all();
        true
    }

    /// 置为 Succeeded；已是终态时返回 false
    pub fn succeed(&self) -> bool {
        self.settle(CompletionState::Succeeded)
    }

    /// 置为 Faulted；已是终态时返回 false
    pub fn fault(&self, err: ScanError) -> bool {
        self.settle(CompletionState::Faulted(Arc::new(err)))
    }

    pub fn state(&self) -> CompletionState {
        self.lock().clone()
    }

    /// 阻塞直到进入终态
    pub fn wait(&self) -> CompletionState {
        let guard = self.lock();
        let guard = self
            .cond
            .wait_while(guard, |s| !s.is_terminal())
            .unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        let c = Completion::new();
        assert!(matches!(c.state(), CompletionState::Pending));
        assert!(!c.state().is_terminal());
    }

    #[test]
    fn test_first_writer_wins() {
        let c = Completion::new();
        assert!(c.fault(ScanError::EmptyPath));
        assert!(!c.succeed());
        assert!(!c.fault(ScanError::InvalidPath("x".into())));
        match c.state() {
            CompletionState::Faulted(e) => assert_eq!(e.to_string(), "Can't scan empty path"),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_racing_writers_settle_once() {
        let c = Arc::new(Completion::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        c.succeed()
                    } else {
                        c.fault(ScanError::UnitsLost { expected: 1, lost: 1 })
                    }
                })
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|w| *w).count();
        assert_eq!(wins, 1);
        assert!(c.state().is_terminal());
    }

    #[test]
    fn test_wait_wakes_on_success() {
        let c = Arc::new(Completion::new());
        let waiter = {
            let c = Arc::clone(&c);
            std::thread::spawn(move || c.wait())
        };
        assert!(c.succeed());
        assert!(matches!(waiter.join().unwrap(), CompletionState::Succeeded));
    }
}
