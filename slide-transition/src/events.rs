//! # Events 模块
//!
//! 引擎生命周期事件与事件总线。
//!
//! 事件总线是一张扁平的 "事件 → 处理器列表" 表，处理器是普通闭包。
//! `emit` 在调用前先复制处理器列表，处理器中订阅或退订不会影响本次分发。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use tracing::trace;

/// 引擎生命周期事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEvent {
    /// 轨道开始移动
    Move,
    /// 首次构建之前
    BuildBefore,
    /// 窗口尺寸变化，几何重新计算
    Resize,
    /// 边缘偏移移动后的瞬时跳转
    TranslateJump,
    /// 一次运行开始
    Run,
    /// 引擎销毁
    Destroy,
}

impl EngineEvent {
    /// 所有事件
    pub const ALL: [EngineEvent; 6] = [
        Self::Move,
        Self::BuildBefore,
        Self::Resize,
        Self::TranslateJump,
        Self::Run,
        Self::Destroy,
    ];

    /// 事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::BuildBefore => "build.before",
            Self::Resize => "resize",
            Self::TranslateJump => "translate.jump",
            Self::Run => "run",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineEvent {
    type Err = String;

    /// 同时接受点号形式（`build.before`）和连字符形式（`build-before`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(Self::Move),
            "build.before" | "build-before" => Ok(Self::BuildBefore),
            "resize" => Ok(Self::Resize),
            "translate.jump" | "translate-jump" => Ok(Self::TranslateJump),
            "run" => Ok(Self::Run),
            "destroy" => Ok(Self::Destroy),
            other => Err(format!("未知事件: {other}")),
        }
    }
}

/// 订阅 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// 事件处理器
pub type Handler = Rc<dyn Fn()>;

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<EngineEvent, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.borrow().values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl EventBus {
    /// 创建空的事件总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一个或多个事件注册同一个处理器
    ///
    /// 返回的订阅 ID 可用于 [`EventBus::off`]，一次退订覆盖所有事件。
    pub fn on<F>(&self, events: &[EngineEvent], handler: F) -> SubscriptionId
    where
        F: Fn() + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let handler: Handler = Rc::new(handler);
        let mut handlers = self.handlers.borrow_mut();
        for event in events {
            handlers
                .entry(*event)
                .or_default()
                .push((id, Rc::clone(&handler)));
        }
        id
    }

    /// 退订；未知 ID 为无操作
    pub fn off(&self, id: SubscriptionId) {
        for list in self.handlers.borrow_mut().values_mut() {
            list.retain(|(sub, _)| *sub != id);
        }
    }

    /// 分发事件
    pub fn emit(&self, event: EngineEvent) {
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .get(&event)
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default();

        trace!(%event, handlers = snapshot.len(), "分发事件");
        for handler in snapshot {
            handler();
        }
    }

    /// 某事件的处理器数量
    pub fn handler_count(&self, event: EngineEvent) -> usize {
        self.handlers.borrow().get(&event).map_or(0, Vec::len)
    }
}
