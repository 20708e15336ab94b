//! is-antibot - 识别 HTTP 响应中的反爬 / 验证码 / WAF 挑战
//!
//! 针对一次 HTTP 交换（响应 Header、响应体、请求 URL）执行内置厂商签名，
//! 返回最可能的厂商、置信度以及多厂商命中时的排名列表。
//!
//! ```
//! use is_antibot::{classify, Exchange, HeaderBag};
//!
//! let headers: HeaderBag = [("cf-mitigated", "challenge")].into_iter().collect();
//! let verdict = classify(&Exchange::new().with_headers(&headers));
//! assert!(verdict.detected);
//! assert_eq!(verdict.provider.as_deref(), Some("cloudflare"));
//! assert_eq!(verdict.confidence, 100);
//! ```

pub mod analyzer;
pub mod config;
pub mod detector;
pub mod error;
pub mod exchange;
pub mod rule;
pub mod utils;

// 导出全局错误类型
pub use self::error::{AbResult, AntibotError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, DetectorConfig, HeaderCase};

// 导出输入模型
pub use self::exchange::{Exchange, ExchangeRecord, HeaderBag, HeaderLookup, HeaderValue};

// 导出规则模块核心接口
pub use self::rule::{Detection, Evidence, Rule, Signature, Verdict, DEFAULT_CATALOG};

// 导出工具模块核心接口
pub use self::utils::{HarLoader, HeaderConverter};

// 导出检测模块核心接口
pub use self::detector::{
    classify, global_detector, init_global_detector, AntibotDetector, NoopObserver,
    TracingObserver, VerdictEvent, VerdictObserver,
};
