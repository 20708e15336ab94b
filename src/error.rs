//! 全局错误类型定义
//! 检测本身不会失败，错误只出现在边界：输入文档解析、自定义签名库校验、全局初始化
use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;

#[derive(Error, Debug)]
pub enum AntibotError {
    // 输入相关错误
    #[error("无效输入：{0}")]
    InvalidInput(String),
    /// headers 既不是字符串映射，也不是字符串数组映射
    #[error("不支持的Header表示形式：{0}")]
    UnsupportedHeaders(String),
    #[error("HAR解析失败：{0}")]
    HarParseError(String),

    // 签名库相关错误
    #[error("无效签名：{0}")]
    InvalidSignature(String),
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 检测器相关错误
    #[error("检测器初始化失败：{0}")]
    DetectorInitError(String),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type AbResult<T> = Result<T, AntibotError>;
