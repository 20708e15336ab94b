//! Antibot detector core module
//! 反爬检测器核心
//! 核心职责：
//! 1. 持有签名库（内置或自定义）与检测配置
//! 2. 逐个执行签名，收集非零得分
//! 3. 选出最高分厂商（同分按声明顺序），输出检测结论并通知观察者

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use http::header::HeaderMap;
use rustc_hash::FxHashSet;

use super::observer::{TracingObserver, VerdictEvent, VerdictObserver};
use crate::analyzer::{CompiledPatterns, ScanContext};
use crate::config::DetectorConfig;
use crate::error::{AbResult, AntibotError};
use crate::exchange::Exchange;
use crate::rule::catalog::default_patterns;
use crate::rule::signature::compile_patterns;
use crate::rule::{Detection, Signature, Verdict, DEFAULT_CATALOG};
use crate::utils::HeaderConverter;

/// 反爬检测器
/// 无内部可变状态，可跨线程共享并发调用
#[derive(Clone)]
pub struct AntibotDetector {
    /// 检测配置
    config: DetectorConfig,
    /// 签名库，声明顺序决定同分优先级
    catalog: Arc<[Signature]>,
    /// 签名库正则，构建时编译一次
    patterns: Arc<CompiledPatterns>,
    /// 诊断观察者
    observer: Arc<dyn VerdictObserver>,
}

impl AntibotDetector {
    /// 使用内置签名库与默认配置创建检测器
    pub fn new() -> Self {
        Self::with_config(DetectorConfig::default())
    }

    /// 使用内置签名库创建检测器
    pub fn with_config(config: DetectorConfig) -> Self {
        Self {
            config,
            catalog: Arc::from(DEFAULT_CATALOG),
            patterns: default_patterns(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// 使用自定义签名库创建检测器
    /// 校验：签名库非空、厂商名非空且唯一、每条规则得分在 1..=100
    pub fn with_catalog(catalog: Vec<Signature>, config: DetectorConfig) -> AbResult<Self> {
        validate_catalog(&catalog)?;
        Ok(Self {
            config,
            patterns: Arc::new(compile_patterns(&catalog)),
            catalog: Arc::from(catalog),
            observer: Arc::new(TracingObserver),
        })
    }

    /// 替换诊断观察者
    pub fn with_observer(mut self, observer: impl VerdictObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[Signature] {
        &self.catalog
    }

    /// 核心检测方法
    /// 纯函数：同一输入总是得到同一结论，不会失败
    pub fn classify(&self, exchange: &Exchange<'_>) -> Verdict {
        let ctx = ScanContext::new(exchange, &self.config, &self.patterns);

        // 1. 逐个执行签名，保留全部非零得分
        let mut provider: Option<&'static str> = None;
        let mut confidence = 0u8;
        let mut detections = Vec::new();
        for signature in self.catalog.iter() {
            let score = signature.evaluate(&ctx);
            if score == 0 {
                continue;
            }
            detections.push(Detection::new(signature.name, score));
            // 严格大于：同分时先声明的厂商保留优先级
            if score > confidence {
                confidence = score;
                provider = Some(signature.name);
            }
        }

        // 2. 按置信度降序（稳定排序，同分保持声明顺序）
        detections.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        let matched = detections.len();

        let verdict = Verdict {
            detected: provider.is_some(),
            provider: provider.map(str::to_string),
            confidence,
            detections: (matched > 1).then_some(detections),
        };

        // 3. 诊断通知
        self.observer.on_verdict(&VerdictEvent::new(&verdict, matched));
        verdict
    }

    /// 便捷检测接口（HeaderMap + 原始响应体 + URL）
    /// HeaderMap 先按 max_header_count 转为 HeaderBag
    pub fn classify_response(&self, headers: &HeaderMap, body: &[u8], url: &str) -> Verdict {
        let headers = HeaderConverter::to_header_bag(headers, self.config.max_header_count);
        let body: Cow<'_, str> = String::from_utf8_lossy(body);
        let exchange = Exchange::new().with_headers(&headers).with_body(&body).with_url(url);
        self.classify(&exchange)
    }
}

impl Default for AntibotDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AntibotDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AntibotDetector")
            .field("config", &self.config)
            .field("catalog", &self.catalog.iter().map(|s| s.name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn validate_catalog(catalog: &[Signature]) -> AbResult<()> {
    if catalog.is_empty() {
        return Err(AntibotError::InvalidSignature("catalog is empty".to_string()));
    }

    let mut seen = FxHashSet::default();
    for signature in catalog {
        if signature.name.trim().is_empty() {
            return Err(AntibotError::InvalidSignature("vendor name is empty".to_string()));
        }
        if !seen.insert(signature.name) {
            return Err(AntibotError::InvalidSignature(format!(
                "duplicate vendor name: {}",
                signature.name
            )));
        }
        if let Some(rule) = signature.rules.iter().find(|r| r.score == 0 || r.score > 100) {
            return Err(AntibotError::InvalidSignature(format!(
                "{}: score {} out of range 1..=100 for rule {}",
                signature.name,
                rule.score,
                rule.evidence.describe()
            )));
        }
    }
    Ok(())
}
