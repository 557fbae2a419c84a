//! # Context 模块
//!
//! 移动上下文：轮播类型与当前运行是否处于边缘回绕。
//!
//! 偏移量由移动组件（run）负责计算，过渡组件只读取。

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// 轮播类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliderType {
    /// 普通滑块：到达边缘时回绕到另一端
    #[default]
    Slider,
    /// 循环轮播：通过克隆元素无缝衔接
    Carousel,
}

impl SliderType {
    /// 类型名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Carousel => "carousel",
        }
    }
}

impl fmt::Display for SliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SliderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slider" => Ok(Self::Slider),
            "carousel" => Ok(Self::Carousel),
            other => Err(format!("未知轮播类型: {other}")),
        }
    }
}

/// 移动上下文接口
///
/// 过渡组件每次计算时长时都会重新读取，不缓存。
pub trait MovementContext {
    /// 当前轮播类型
    fn slider_type(&self) -> SliderType;

    /// 当前运行的回绕偏移量，非零表示本次移动是边缘回绕
    fn offset(&self) -> i64;
}

/// 内存中的移动状态
///
/// 宿主可直接持有并在每次运行前更新偏移量。
#[derive(Debug, Default)]
pub struct RunState {
    slider_type: Cell<SliderType>,
    offset: Cell<i64>,
}

impl RunState {
    /// 创建指定类型的移动状态
    pub fn new(slider_type: SliderType) -> Self {
        Self {
            slider_type: Cell::new(slider_type),
            offset: Cell::new(0),
        }
    }

    /// 设置轮播类型
    pub fn set_slider_type(&self, slider_type: SliderType) {
        self.slider_type.set(slider_type);
    }

    /// 设置回绕偏移量
    pub fn set_offset(&self, offset: i64) {
        self.offset.set(offset);
    }
}

impl MovementContext for RunState {
    fn slider_type(&self) -> SliderType {
        self.slider_type.get()
    }

    fn offset(&self) -> i64 {
        self.offset.get()
    }
}
