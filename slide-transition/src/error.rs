//! # Error 模块
//!
//! 定义 slide-transition 中使用的错误类型。
//!
//! 过渡组件本身的操作均不可失败；只有配置加载与校验会返回错误。

use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum SettingsError {
    /// 读取配置文件失败
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 配置值无效
    #[error("配置验证失败: 字段 '{field}' - {message}")]
    Validation { field: &'static str, message: String },
}

/// Result 类型别名
pub type SettingsResult<T> = Result<T, SettingsError>;
