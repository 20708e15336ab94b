//! 检测模块：签名聚合与结论输出
pub mod global;
pub mod detector;
pub mod observer;

// 导出核心接口
pub use self::global::{classify, global_detector, init_global_detector};
pub use self::detector::AntibotDetector;
pub use self::observer::{NoopObserver, TracingObserver, VerdictEvent, VerdictObserver};
