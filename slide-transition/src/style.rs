//! # Style 模块
//!
//! 过渡样式的写入目标。
//!
//! 组件只读写目标元素上的 `transition` 一个属性，不触碰其他状态。

use std::cell::RefCell;

/// 无过渡标记
pub const NO_MOTION: &str = "none";

/// 默认过渡属性
pub const DEFAULT_PROPERTY: &str = "transform";

/// 可写入过渡样式的目标元素
pub trait StyleTarget {
    /// 写入 `transition` 样式值，空字符串表示清除
    fn set_transition(&self, value: &str);

    /// 读取当前 `transition` 样式值
    fn transition(&self) -> String;
}

/// 内存中的轨道样式
///
/// 记录每一次写入，便于宿主调试和测试断言。
#[derive(Debug, Default)]
pub struct TrackStyle {
    current: RefCell<String>,
    history: RefCell<Vec<String>>,
}

impl TrackStyle {
    /// 创建空的轨道样式
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有写入记录（按时间顺序）
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// 清空写入记录
    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }
}

impl StyleTarget for TrackStyle {
    fn set_transition(&self, value: &str) {
        *self.current.borrow_mut() = value.to_string();
        self.history.borrow_mut().push(value.to_string());
    }

    fn transition(&self) -> String {
        self.current.borrow().clone()
    }
}

#[cfg(feature = "web")]
impl StyleTarget for web_sys::HtmlElement {
    fn set_transition(&self, value: &str) {
        if let Err(err) = self.style().set_property("transition", value) {
            tracing::warn!(?err, value, "写入 transition 样式失败");
        }
    }

    fn transition(&self) -> String {
        self.style()
            .get_property_value("transition")
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_style_records_writes() {
        let style = TrackStyle::new();
        assert_eq!(style.transition(), "");

        style.set_transition("transform 400ms ease");
        style.set_transition(NO_MOTION);
        assert_eq!(style.transition(), "none");
        assert_eq!(style.history(), vec!["transform 400ms ease", "none"]);

        style.clear_history();
        assert!(style.history().is_empty());
        assert_eq!(style.transition(), "none");
    }
}
