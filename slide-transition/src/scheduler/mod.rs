//! # Scheduler 模块
//!
//! 一次性定时器的抽象。
//!
//! ## 设计说明
//!
//! - 调度器是单线程的，任务在同一逻辑线程上稍后执行
//! - 任务执行期间允许再次调用 `schedule` / `cancel`
//! - 取消一个已触发或不存在的句柄是无操作
//!
//! ## 后端
//!
//! - [`ManualScheduler`]：虚拟时钟，由宿主逐帧推进（`advance`）
//! - [`TokioScheduler`]：基于 `tokio::task::spawn_local`（需要 `tokio` feature）

mod manual;
#[cfg(feature = "tokio")]
mod tokio_local;

pub use manual::ManualScheduler;
#[cfg(feature = "tokio")]
pub use tokio_local::TokioScheduler;

/// 定时器任务
pub type TimerTask = Box<dyn FnOnce()>;

/// 定时器句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u64);

impl TimerHandle {
    /// 创建新的定时器句柄
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimerHandle({})", self.0)
    }
}

/// 一次性定时器调度接口
pub trait Scheduler {
    /// 在 `delay_ms` 毫秒后执行 `task`
    fn schedule(&self, delay_ms: u64, task: TimerTask) -> TimerHandle;

    /// 取消尚未触发的定时器
    fn cancel(&self, handle: TimerHandle);
}
