//! # Slide Transition
//!
//! 轮播引擎的过渡时序控制器。
//!
//! ## 架构概述
//!
//! `slide-transition` 决定何时给移动中的轨道元素应用过渡样式、计算本次移动的
//! 动画时长，并允许引擎其他部分把工作推迟到当前动画结束之后：
//!
//! ```text
//! EventBus                      Transition                      StyleTarget
//!   │── move ─────────────────►│ set()       ── "transform 400ms ease" ──►│
//!   │── build.before/resize ──►│ disable()   ── "none" ─────────────────►│
//!   │   translate.jump         │   └─ call_after_handlers()               │
//!   │── run ──────────────────►│ enable()                                 │
//!   │── destroy ──────────────►│ remove()    ── "" ─────────────────────►│
//!                              │
//!               after(cb) ────►│── Scheduler::schedule(duration) ──► cb()
//! ```
//!
//! 组件是单线程的；所有共享状态使用 `Rc` + `Cell` / `RefCell`。
//!
//! ## 核心类型
//!
//! - [`Transition`]：过渡控制器
//! - [`TransitionSettings`]：时长与缓动配置
//! - [`MovementContext`] / [`RunState`]：轮播类型与回绕偏移
//! - [`StyleTarget`] / [`TrackStyle`]：样式写入目标
//! - [`Scheduler`] / [`ManualScheduler`]：一次性定时器
//! - [`EventBus`] / [`EngineEvent`]：生命周期事件
//!
//! ## 模块结构
//!
//! - [`transition`]：过渡控制器
//! - [`settings`]：配置加载与校验
//! - [`context`]：移动上下文
//! - [`style`]：样式目标
//! - [`scheduler`]：定时器后端
//! - [`events`]：事件总线
//! - [`error`]：错误类型定义

pub mod context;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod settings;
pub mod style;
pub mod transition;

// 重导出核心类型
pub use context::{MovementContext, RunState, SliderType};
pub use error::{SettingsError, SettingsResult};
pub use events::{EngineEvent, EventBus, Handler, SubscriptionId};
#[cfg(feature = "tokio")]
pub use scheduler::TokioScheduler;
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle, TimerTask};
pub use settings::TransitionSettings;
pub use style::{DEFAULT_PROPERTY, NO_MOTION, StyleTarget, TrackStyle};
pub use transition::{AfterCallback, Transition};
