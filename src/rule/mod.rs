//! 规则模块：签名数据模型、内置签名库、检测结果定义
pub mod signature;
pub mod catalog;
pub mod detect_result;

// 导出核心接口
pub use self::catalog::{find_signature, DEFAULT_CATALOG};
pub use self::detect_result::{Detection, Verdict};
pub use self::signature::{Evidence, Rule, Signature};
