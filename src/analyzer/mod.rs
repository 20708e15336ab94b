//! 证据提取层：Header/Cookie 访问器、模式匹配与单次扫描上下文
pub mod header;
pub mod cookie;
pub mod pattern;

pub use self::cookie::{get_cookie, has_cookie, CookieMatch};
pub use self::header::HeaderAccessor;
pub use self::pattern::{regex_is_match, test_pattern, CompiledPatterns, PatternKind};

use crate::config::DetectorConfig;
use crate::exchange::Exchange;

/// 单次检测的扫描上下文
/// 由 Exchange + 配置 + 预编译正则构建，所有签名共享同一只读视图
pub struct ScanContext<'a> {
    pub headers: HeaderAccessor<'a>,
    pub body: &'a str,
    pub url: &'a str,
    pub patterns: &'a CompiledPatterns,
}

impl<'a> ScanContext<'a> {
    pub fn new(exchange: &Exchange<'a>, config: &DetectorConfig, patterns: &'a CompiledPatterns) -> Self {
        Self {
            headers: HeaderAccessor::with_limit(exchange.headers, config.header_case, config.max_header_count),
            body: bounded(exchange.body, config.max_scan_bytes),
            url: bounded(exchange.url, config.max_scan_bytes),
            patterns,
        }
    }
}

/// 截取至多 limit 字节，落在 UTF-8 字符边界上
fn bounded(text: &str, limit: Option<usize>) -> &str {
    match limit {
        Some(limit) if text.len() > limit => {
            let mut end = limit;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            &text[..end]
        }
        _ => text,
    }
}
