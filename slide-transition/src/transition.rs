//! # Transition 模块
//!
//! 轨道元素的过渡时序控制器。
//!
//! ## 职责
//!
//! - **时长策略**：根据配置和移动上下文计算当前动画时长（每次读取都重新计算）
//! - **样式写入**：组合并写入 / 清除 `transition` 样式，受启用开关控制
//! - **延迟完成队列**：`after(callback)` 在当前动画时长结束后执行回调；
//!   禁用过渡时立即强制执行所有等待中的回调
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let transition = Transition::new(settings, run_state, track_style, scheduler);
//! transition.mount(&bus);
//!
//! transition.after(|| println!("slide finished"));
//! bus.emit(EngineEvent::Resize); // 禁用过渡并立即执行回调
//! ```
//!
//! ## 重入
//!
//! 回调执行期间不持有任何内部借用，回调中可以再次调用 `after`、`disable` 等操作。
//! 每个条目在执行前已从队列移除，因此无论经由到期还是强制执行，回调都只运行一次。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use crate::context::{MovementContext, SliderType};
use crate::events::{EngineEvent, EventBus, SubscriptionId};
use crate::scheduler::{Scheduler, TimerHandle};
use crate::settings::TransitionSettings;
use crate::style::{DEFAULT_PROPERTY, NO_MOTION, StyleTarget};

/// 延迟回调
pub type AfterCallback = Box<dyn FnOnce()>;

/// 延迟条目 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EntryId(u64);

/// 等待动画结束的回调
struct DeferredEntry {
    id: EntryId,
    callback: AfterCallback,
    timer: TimerHandle,
}

/// 过渡时序控制器
///
/// 每个引擎实例构造一次，通过 `Rc` 共享给需要按动画完成时刻排序工作的组件。
pub struct Transition {
    /// 自身弱引用（供定时器任务回调）
    this: Weak<Transition>,
    settings: RefCell<TransitionSettings>,
    context: Rc<dyn MovementContext>,
    target: Rc<dyn StyleTarget>,
    scheduler: Rc<dyn Scheduler>,
    /// 为 true 时样式写入 `none`
    disabled: Cell<bool>,
    /// 等待中的回调（插入顺序）
    pending: RefCell<VecDeque<DeferredEntry>>,
    next_entry_id: Cell<u64>,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("settings", &self.settings.borrow())
            .field("disabled", &self.disabled.get())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl Transition {
    /// 创建过渡控制器
    ///
    /// 初始为启用状态，不会立即写入样式。
    pub fn new(
        settings: TransitionSettings,
        context: Rc<dyn MovementContext>,
        target: Rc<dyn StyleTarget>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            settings: RefCell::new(settings),
            context,
            target,
            scheduler,
            disabled: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
            next_entry_id: Cell::new(1),
        })
    }

    /// 订阅引擎生命周期事件
    ///
    /// - `move`：重新写入样式（偏移移动可能已将其清除）
    /// - `build.before` / `resize` / `translate.jump`：禁用过渡
    /// - `run`：启用过渡
    /// - `destroy`：清除样式，恢复元素初始状态
    ///
    /// 处理器只持有弱引用；控制器释放后处理器不再生效。
    pub fn mount(&self, bus: &EventBus) -> Vec<SubscriptionId> {
        let bind = |events: &[EngineEvent], action: fn(&Transition)| {
            let this = self.this.clone();
            bus.on(events, move || {
                if let Some(transition) = this.upgrade() {
                    action(&transition);
                }
            })
        };

        vec![
            bind(&[EngineEvent::Move], Transition::set),
            bind(
                &[
                    EngineEvent::BuildBefore,
                    EngineEvent::Resize,
                    EngineEvent::TranslateJump,
                ],
                Transition::disable,
            ),
            bind(&[EngineEvent::Run], Transition::enable),
            bind(&[EngineEvent::Destroy], Transition::remove),
        ]
    }

    // ========== 时长策略 ==========

    /// 当前动画时长（毫秒）
    ///
    /// `slider` 类型且本次移动为边缘回绕时使用回绕时长，否则使用普通动画时长。
    pub fn duration(&self) -> u64 {
        let settings = self.settings.borrow();
        let rewinding =
            self.context.slider_type() == SliderType::Slider && self.context.offset() != 0;
        if rewinding {
            settings.rewind_duration
        } else {
            settings.animation_duration
        }
    }

    /// 当前配置
    pub fn settings(&self) -> TransitionSettings {
        self.settings.borrow().clone()
    }

    /// 替换配置，之后的时长与样式立即使用新值
    pub fn update_settings(&self, settings: TransitionSettings) {
        *self.settings.borrow_mut() = settings;
    }

    // ========== 样式写入 ==========

    /// 组合 `transition` 样式值
    pub fn compose(&self, property: &str) -> String {
        if self.disabled.get() {
            return NO_MOTION.to_string();
        }

        format!(
            "{} {}ms {}",
            property,
            self.duration(),
            self.settings.borrow().animation_timing_func
        )
    }

    /// 为 `transform` 属性写入过渡样式
    pub fn set(&self) {
        self.set_for(DEFAULT_PROPERTY);
    }

    /// 为指定属性写入过渡样式
    pub fn set_for(&self, property: &str) {
        self.target.set_transition(&self.compose(property));
    }

    /// 清除过渡样式
    pub fn remove(&self) {
        self.target.set_transition("");
    }

    // ========== 延迟完成队列 ==========

    /// 在当前动画时长结束后执行回调
    ///
    /// 时长在调用时确定；禁用过渡会提前执行。
    pub fn after<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        let id = EntryId(self.next_entry_id.get());
        self.next_entry_id.set(self.next_entry_id.get() + 1);

        let delay = self.duration();
        let this = self.this.clone();
        let timer = self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(transition) = this.upgrade() {
                    transition.fire(id);
                }
            }),
        );

        trace!(entry = id.0, delay, %timer, "登记延迟回调");
        self.pending.borrow_mut().push_back(DeferredEntry {
            id,
            callback: Box::new(callback),
            timer,
        });
    }

    /// 立即执行所有等待中的回调（按插入顺序）
    ///
    /// 只处理调用时已在队列中的条目；回调中新登记的条目按各自的定时器执行。
    pub fn call_after_handlers(&self) {
        let ids: Vec<EntryId> = self.pending.borrow().iter().map(|e| e.id).collect();
        if ids.is_empty() {
            return;
        }

        debug!(count = ids.len(), "强制执行延迟回调");
        for id in ids {
            self.fire(id);
        }
    }

    /// 执行单个条目：移除、取消定时器、调用回调
    ///
    /// 到期触发与强制执行共用此路径；条目已不在队列中时为无操作。
    fn fire(&self, id: EntryId) {
        let entry = {
            let mut pending = self.pending.borrow_mut();
            match pending.iter().position(|e| e.id == id) {
                Some(index) => pending.remove(index),
                None => None,
            }
        };

        let Some(entry) = entry else {
            trace!(entry = id.0, "延迟回调已执行，跳过");
            return;
        };

        self.scheduler.cancel(entry.timer);
        trace!(entry = id.0, "执行延迟回调");
        (entry.callback)();
    }

    /// 等待中的回调数量
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    // ========== 启用开关 ==========

    /// 启用过渡并重新写入样式
    pub fn enable(&self) {
        if self.disabled.replace(false) {
            debug!("启用过渡");
        }
        self.set();
    }

    /// 禁用过渡：写入 `none` 并立即执行所有等待中的回调
    pub fn disable(&self) {
        if !self.disabled.replace(true) {
            debug!("禁用过渡");
        }
        self.set();
        self.call_after_handlers();
    }

    /// 过渡是否被禁用
    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }
}

impl Drop for Transition {
    /// 取消剩余定时器，并按插入顺序执行尚未执行的回调
    ///
    /// 回调此时已无法访问控制器本身（弱引用失效）。
    fn drop(&mut self) {
        let pending = std::mem::take(self.pending.get_mut());
        if pending.is_empty() {
            return;
        }

        for entry in &pending {
            self.scheduler.cancel(entry.timer);
        }

        debug!(count = pending.len(), "释放前执行剩余延迟回调");
        for entry in pending {
            (entry.callback)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunState;
    use crate::scheduler::ManualScheduler;
    use crate::style::TrackStyle;

    struct Fixture {
        transition: Rc<Transition>,
        run: Rc<RunState>,
        style: Rc<TrackStyle>,
        scheduler: Rc<ManualScheduler>,
    }

    fn fixture(slider_type: SliderType) -> Fixture {
        let run = Rc::new(RunState::new(slider_type));
        let style = Rc::new(TrackStyle::new());
        let scheduler = Rc::new(ManualScheduler::new());
        let settings = TransitionSettings {
            animation_duration: 400,
            rewind_duration: 800,
            animation_timing_func: "ease".to_string(),
        };
        let transition = Transition::new(settings, run.clone(), style.clone(), scheduler.clone());
        Fixture {
            transition,
            run,
            style,
            scheduler,
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl Fn() -> AfterCallback) {
        let count = Rc::new(Cell::new(0));
        let shared = count.clone();
        let make = move || -> AfterCallback {
            let count = shared.clone();
            Box::new(move || count.set(count.get() + 1))
        };
        (count, make)
    }

    #[test]
    fn test_compose_enabled() {
        let f = fixture(SliderType::Slider);
        assert_eq!(f.transition.compose("transform"), "transform 400ms ease");
        assert_eq!(f.transition.compose("opacity"), "opacity 400ms ease");
    }

    #[test]
    fn test_compose_disabled_ignores_settings() {
        let f = fixture(SliderType::Slider);
        f.transition.disable();
        assert_eq!(f.transition.compose("transform"), "none");

        f.transition.update_settings(TransitionSettings {
            animation_duration: 1,
            rewind_duration: 2,
            animation_timing_func: "linear".to_string(),
        });
        f.run.set_offset(1);
        assert_eq!(f.transition.compose("transform"), "none");
    }

    #[test]
    fn test_duration_policy() {
        let f = fixture(SliderType::Slider);
        assert_eq!(f.transition.duration(), 400);

        f.run.set_offset(1);
        assert_eq!(f.transition.duration(), 800);

        f.run.set_slider_type(SliderType::Carousel);
        assert_eq!(f.transition.duration(), 400);

        f.run.set_offset(0);
        assert_eq!(f.transition.duration(), 400);
    }

    #[test]
    fn test_duration_tracks_settings_update() {
        let f = fixture(SliderType::Slider);
        f.transition.update_settings(TransitionSettings {
            animation_duration: 250,
            ..f.transition.settings()
        });
        assert_eq!(f.transition.duration(), 250);
        assert_eq!(f.transition.compose("transform"), "transform 250ms ease");
    }

    #[test]
    fn test_set_and_remove() {
        let f = fixture(SliderType::Slider);
        f.transition.set();
        assert_eq!(f.style.transition(), "transform 400ms ease");

        f.transition.set_for("opacity");
        assert_eq!(f.style.transition(), "opacity 400ms ease");

        f.transition.remove();
        assert_eq!(f.style.transition(), "");

        f.transition.enable();
        assert_eq!(f.style.transition(), "transform 400ms ease");
    }

    #[test]
    fn test_after_fires_on_expiry() {
        let f = fixture(SliderType::Slider);
        let (count, cb) = counter();

        for _ in 0..3 {
            f.transition.after(cb());
        }
        assert_eq!(f.transition.pending_len(), 3);

        f.scheduler.advance(399);
        assert_eq!(count.get(), 0);

        f.scheduler.advance(1);
        assert_eq!(count.get(), 3);
        assert_eq!(f.transition.pending_len(), 0);

        f.scheduler.advance(10_000);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_after_uses_duration_at_call_time() {
        let f = fixture(SliderType::Slider);
        let (count, cb) = counter();

        f.run.set_offset(1);
        f.transition.after(cb());
        f.run.set_offset(0);

        f.scheduler.advance(400);
        assert_eq!(count.get(), 0);
        f.scheduler.advance(400);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_disable_flushes_synchronously() {
        let f = fixture(SliderType::Slider);
        let (count, cb) = counter();

        f.transition.after(cb());
        f.scheduler.advance(100);
        f.transition.disable();

        assert_eq!(count.get(), 1);
        assert_eq!(f.transition.pending_len(), 0);
        assert_eq!(f.scheduler.pending_timers(), 0);
        assert_eq!(f.style.transition(), "none");

        // 原定时器不会再次触发
        f.scheduler.advance(1000);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_flush_is_fifo() {
        let f = fixture(SliderType::Slider);
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..4 {
            let order = order.clone();
            f.transition.after(move || order.borrow_mut().push(i));
        }
        f.transition.call_after_handlers();

        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_flush_empty_queue_is_noop() {
        let f = fixture(SliderType::Slider);
        f.transition.call_after_handlers();
        assert_eq!(f.transition.pending_len(), 0);
        assert!(f.style.history().is_empty());
    }

    #[test]
    fn test_after_during_flush_is_not_drained() {
        let f = fixture(SliderType::Slider);
        let (count, cb) = counter();

        let transition = f.transition.clone();
        let nested = cb();
        f.transition.after(move || transition.after(nested));

        f.transition.disable();
        assert_eq!(count.get(), 0);
        assert_eq!(f.transition.pending_len(), 1);

        f.scheduler.advance(400);
        assert_eq!(count.get(), 1);
        assert_eq!(f.transition.pending_len(), 0);
    }

    #[test]
    fn test_reentrant_disable_fires_each_once() {
        let f = fixture(SliderType::Slider);
        let order = Rc::new(RefCell::new(Vec::new()));

        let transition = f.transition.clone();
        let first = order.clone();
        f.transition.after(move || {
            first.borrow_mut().push("a");
            transition.disable();
        });
        for name in ["b", "c"] {
            let order = order.clone();
            f.transition.after(move || order.borrow_mut().push(name));
        }

        f.transition.disable();
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
        assert_eq!(f.transition.pending_len(), 0);
    }

    #[test]
    fn test_enable_disable_idempotent() {
        let f = fixture(SliderType::Slider);
        f.transition.disable();
        f.transition.disable();
        assert!(f.transition.is_disabled());
        assert_eq!(f.style.history(), vec!["none", "none"]);

        f.transition.enable();
        f.transition.enable();
        assert!(!f.transition.is_disabled());
        assert_eq!(f.style.transition(), "transform 400ms ease");
    }

    #[test]
    fn test_drop_runs_pending_callbacks_once() {
        let f = fixture(SliderType::Slider);
        let (count, cb) = counter();
        let order = Rc::new(RefCell::new(Vec::new()));

        f.transition.after(cb());
        for i in 0..3 {
            let order = order.clone();
            f.transition.after(move || order.borrow_mut().push(i));
        }
        assert_eq!(f.scheduler.pending_timers(), 4);

        drop(f.transition);
        assert_eq!(count.get(), 1);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(f.scheduler.pending_timers(), 0);

        // 原定时器不会再次触发
        f.scheduler.advance(10_000);
        assert_eq!(count.get(), 1);
    }

    /// 自定义移动上下文
    struct FixedContext {
        slider_type: SliderType,
        offset: i64,
    }

    impl MovementContext for FixedContext {
        fn slider_type(&self) -> SliderType {
            self.slider_type
        }

        fn offset(&self) -> i64 {
            self.offset
        }
    }

    #[test]
    fn test_duration_policy_with_custom_context() {
        let cases = [
            (SliderType::Slider, 0, 400),
            (SliderType::Slider, -2, 800),
            (SliderType::Carousel, 0, 400),
            (SliderType::Carousel, 3, 400),
        ];

        for (slider_type, offset, expected) in cases {
            let transition = Transition::new(
                TransitionSettings::default(),
                Rc::new(FixedContext {
                    slider_type,
                    offset,
                }),
                Rc::new(TrackStyle::new()),
                Rc::new(ManualScheduler::new()),
            );
            assert_eq!(
                transition.duration(),
                expected,
                "{slider_type} / offset {offset}"
            );
        }
    }
}
