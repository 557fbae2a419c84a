//! # Manual 模块
//!
//! 虚拟时钟调度器。
//!
//! 时间只在宿主调用 `advance(dt)` 时前进，适合逐帧驱动的宿主和确定性测试。
//! 到期的定时器按 (截止时间, 调度顺序) 依次触发。

use std::cell::{Cell, RefCell};

use tracing::trace;

use super::{Scheduler, TimerHandle, TimerTask};

/// 已调度的定时器
struct ScheduledTimer {
    handle: TimerHandle,
    deadline: u64,
    task: TimerTask,
}

/// 虚拟时钟调度器
pub struct ManualScheduler {
    /// 当前虚拟时间（毫秒）
    now: Cell<u64>,
    /// 下一个句柄 ID
    next_id: Cell<u64>,
    /// 未触发的定时器
    timers: RefCell<Vec<ScheduledTimer>>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("timers", &self.timers.borrow().len())
            .finish()
    }
}

impl ManualScheduler {
    /// 创建虚拟时间从 0 开始的调度器
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            next_id: Cell::new(1),
            timers: RefCell::new(Vec::new()),
        }
    }

    /// 当前虚拟时间（毫秒）
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// 未触发的定时器数量
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// 推进虚拟时间，并触发期间到期的所有定时器
    ///
    /// 任务执行时不持有内部借用，任务中新调度且在本次推进范围内到期的定时器
    /// 也会在本次调用中触发。
    pub fn advance(&self, dt_ms: u64) {
        let target = self.now.get().saturating_add(dt_ms);

        while let Some(timer) = self.take_next_due(target) {
            self.now.set(timer.deadline.max(self.now.get()));
            trace!(handle = %timer.handle, now = self.now.get(), "定时器触发");
            (timer.task)();
        }

        self.now.set(target);
    }

    /// 取出最早到期的定时器
    fn take_next_due(&self, target: u64) -> Option<ScheduledTimer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= target)
            .min_by_key(|(_, t)| (t.deadline, t.handle))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        self.timers.borrow_mut().push(ScheduledTimer {
            handle,
            deadline: self.now.get().saturating_add(delay_ms),
            task,
        });
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.timers.borrow_mut().retain(|t| t.handle != handle);
    }
}
