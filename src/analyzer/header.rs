use std::borrow::Cow;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::config::{DetectorConfig, HeaderCase};
use crate::exchange::{HeaderLookup, HeaderValue};

/// Header 访问器
/// 在边界处统一两种 Header 表示，其余检测逻辑只依赖本结构
/// 名称列表与小写索引在构建时生成一次，单次检测内的所有查找共用
#[derive(Clone)]
pub struct HeaderAccessor<'a> {
    source: &'a dyn HeaderLookup,
    case: HeaderCase,
    // 参与名称扫描的 Header，至多 max_header_count 个
    names: Vec<&'a str>,
    // 小写名称 → 原始名称，仅 Normalize 模式构建
    lowered: FxHashMap<String, &'a str>,
}

impl<'a> HeaderAccessor<'a> {
    pub fn new(source: &'a dyn HeaderLookup, case: HeaderCase) -> Self {
        Self::with_limit(source, case, DetectorConfig::default().max_header_count)
    }

    /// 名称扫描（忽略大小写回退、Header 名称正则）最多覆盖 max_header_count 个 Header
    /// 按原名精确查找不受此限制
    pub fn with_limit(source: &'a dyn HeaderLookup, case: HeaderCase, max_header_count: usize) -> Self {
        let mut names = source.names();
        if names.len() > max_header_count {
            warn!(
                max_header_count,
                total = names.len(),
                "Header iteration limit reached, remaining headers ignored"
            );
            names.truncate(max_header_count);
        }

        let mut lowered = FxHashMap::default();
        if case == HeaderCase::Normalize {
            for &name in &names {
                lowered.entry(name.to_ascii_lowercase()).or_insert(name);
            }
        }

        Self {
            source,
            case,
            names,
            lowered,
        }
    }

    /// 按名称取 Header
    /// Normalize 模式：精确查找 → 小写索引查找
    pub fn get(&self, name: &str) -> Option<HeaderValue<'a>> {
        if let Some(value) = self.source.get(name) {
            return Some(value);
        }
        if self.case == HeaderCase::Exact {
            return None;
        }

        let key: Cow<'_, str> = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        };
        let original = *self.lowered.get(key.as_ref())?;
        if original == name {
            return None;
        }
        self.source.get(original)
    }

    /// 首个取值
    pub fn first(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(|v| v.first())
    }

    /// 存在且取值非空
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| v.is_present())
    }

    pub fn names(&self) -> &[&'a str] {
        &self.names
    }

    /// Cookie 原始值：优先 cookie，缺失或为空时回退 set-cookie
    pub fn cookie_header(&self) -> Option<HeaderValue<'a>> {
        self.get("cookie")
            .filter(HeaderValue::is_present)
            .or_else(|| self.get("set-cookie").filter(HeaderValue::is_present))
    }
}
