//! 检测结论诊断通知
//! 观察者只接收通知，不影响返回结果；未配置时行为不变

use crate::rule::Verdict;

/// 诊断事件：只携带排名列表的长度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerdictEvent<'a> {
    pub detected: bool,
    pub provider: Option<&'a str>,
    pub confidence: u8,
    pub detections: usize,
}

impl<'a> VerdictEvent<'a> {
    pub fn new(verdict: &'a Verdict, detections: usize) -> Self {
        Self {
            detected: verdict.detected,
            provider: verdict.provider.as_deref(),
            confidence: verdict.confidence,
            detections,
        }
    }
}

/// 检测结论观察者
pub trait VerdictObserver: Send + Sync {
    fn on_verdict(&self, event: &VerdictEvent<'_>);
}

impl<F> VerdictObserver for F
where
    F: Fn(&VerdictEvent<'_>) + Send + Sync,
{
    fn on_verdict(&self, event: &VerdictEvent<'_>) {
        self(event)
    }
}

/// 默认观察者：输出 tracing debug 事件
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl VerdictObserver for TracingObserver {
    fn on_verdict(&self, event: &VerdictEvent<'_>) {
        tracing::debug!(
            target: "is_antibot",
            detected = event.detected,
            provider = event.provider,
            confidence = event.confidence,
            detections = event.detections,
            "verdict computed"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl VerdictObserver for NoopObserver {
    fn on_verdict(&self, _event: &VerdictEvent<'_>) {}
}
