//! # Settings 模块
//!
//! 过渡相关配置项：动画时长、回绕时长与缓动函数。
//!
//! 键名沿用前端配置的 camelCase 形式（`animationDuration` 等），
//! 缺失的字段使用默认值。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{SettingsError, SettingsResult};

/// 过渡配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSettings {
    /// 普通移动的动画时长（毫秒）
    #[serde(default = "default_animation_duration")]
    pub animation_duration: u64,

    /// 边缘回绕移动的动画时长（毫秒）
    #[serde(default = "default_rewind_duration")]
    pub rewind_duration: u64,

    /// CSS 缓动函数
    #[serde(default = "default_animation_timing_func")]
    pub animation_timing_func: String,
}

fn default_animation_duration() -> u64 {
    400
}

fn default_rewind_duration() -> u64 {
    800
}

fn default_animation_timing_func() -> String {
    "cubic-bezier(.165, .840, .440, 1)".to_string()
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            animation_duration: default_animation_duration(),
            rewind_duration: default_rewind_duration(),
            animation_timing_func: default_animation_timing_func(),
        }
    }
}

impl TransitionSettings {
    /// 从 JSON 字符串解析并校验
    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 读取配置文件，失败时返回错误
    pub fn try_load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "过渡配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(settings) => {
                debug!(path = %path.display(), "过渡配置加载成功");
                settings
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "过渡配置加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 验证配置有效性
    ///
    /// 缓动函数会被直接拼进样式声明，不能为空，也不能包含声明分隔符。
    pub fn validate(&self) -> SettingsResult<()> {
        let func = self.animation_timing_func.trim();

        if func.is_empty() {
            return Err(SettingsError::Validation {
                field: "animationTimingFunc",
                message: "缓动函数不能为空".to_string(),
            });
        }

        if func.contains(';') {
            return Err(SettingsError::Validation {
                field: "animationTimingFunc",
                message: format!("缓动函数包含非法字符 ';': {func}"),
            });
        }

        Ok(())
    }
}
