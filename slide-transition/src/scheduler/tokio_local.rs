//! # Tokio 调度后端
//!
//! 每个定时器是一个 `spawn_local` 任务：`sleep` 到期后执行回调。
//! 必须在 `tokio::task::LocalSet` 内使用。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::{Scheduler, TimerHandle, TimerTask};

/// 基于 tokio LocalSet 的调度器
#[derive(Debug, Default)]
pub struct TokioScheduler {
    next_id: Cell<u64>,
    tasks: Rc<RefCell<HashMap<TimerHandle, JoinHandle<()>>>>,
}

impl TokioScheduler {
    /// 创建调度器（需在 LocalSet 内调度）
    pub fn new() -> Self {
        Self::default()
    }

    /// 未触发的定时器数量
    pub fn pending_timers(&self) -> usize {
        self.tasks.borrow().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let tasks = Rc::clone(&self.tasks);
        let join = tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            // 先移除自身，回调中再取消此句柄即为无操作
            drop(tasks.borrow_mut().remove(&handle));
            task();
        });
        self.tasks.borrow_mut().insert(handle, join);
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(join) = self.tasks.borrow_mut().remove(&handle) {
            join.abort();
        }
    }
}
