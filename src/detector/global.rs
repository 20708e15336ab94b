//! 全局检测器单例管理
//! 核心职责：
//! 1. 维护进程生命周期内唯一的 AntibotDetector 实例
//! 2. 支持懒加载默认实例和手动注入配置

use once_cell::sync::OnceCell;

use super::detector::AntibotDetector;
use crate::config::DetectorConfig;
use crate::error::{AbResult, AntibotError};
use crate::exchange::Exchange;
use crate::rule::Verdict;

/// 全局检测器实例 - 线程安全单例
static GLOBAL_DETECTOR: OnceCell<AntibotDetector> = OnceCell::new();

/// 使用指定配置初始化全局检测器
/// 已初始化（包括已被懒加载）时返回错误，不会静默覆盖
pub fn init_global_detector(config: DetectorConfig) -> AbResult<()> {
    GLOBAL_DETECTOR
        .set(AntibotDetector::with_config(config))
        .map_err(|_| {
            AntibotError::DetectorInitError(
                "global detector already initialized".to_string(),
            )
        })?;

    tracing::debug!("Global AntibotDetector initialized with custom config");
    Ok(())
}

/// 获取全局检测器实例（自动懒加载默认配置）
pub fn global_detector() -> &'static AntibotDetector {
    GLOBAL_DETECTOR.get_or_init(|| {
        tracing::debug!("Lazy initializing global AntibotDetector with default config");
        AntibotDetector::new()
    })
}

/// 使用全局检测器检测
pub fn classify(exchange: &Exchange<'_>) -> Verdict {
    global_detector().classify(exchange)
}
