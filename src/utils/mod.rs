//! 工具模块：Header 转换与 HAR 加载
pub mod header_converter;
pub mod har;

pub use self::har::HarLoader;
pub use self::header_converter::HeaderConverter;
