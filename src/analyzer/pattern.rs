//! 模式匹配工具：字面量包含 / 正则匹配
//! 签名库中的正则在检测器构建时一次性编译为只读表，检测路径上无锁、无缓存写入
//! 编译失败的正则按"不匹配"处理，绝不向上抛出
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;

use crate::error::AbResult;

/// 匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// 忽略大小写的子串包含
    Literal,
    /// 忽略大小写的正则
    Regex,
}

/// 正则表键：(正则模式字符串, 是否忽略大小写)
pub type PatternKey = (&'static str, bool);

/// 预编译正则表
/// 构建后只读，可在线程间共享；编译失败的模式不入表，查询时视为不匹配
#[derive(Debug, Default)]
pub struct CompiledPatterns {
    regexes: FxHashMap<PatternKey, Regex>,
}

impl CompiledPatterns {
    /// 编译给定模式，重复模式只编译一次
    pub fn from_patterns(patterns: impl IntoIterator<Item = PatternKey>) -> Self {
        let mut regexes = FxHashMap::default();
        for key @ (pattern, case_insensitive) in patterns {
            if regexes.contains_key(&key) {
                continue;
            }
            match compile_regex(pattern, case_insensitive) {
                Ok(re) => {
                    regexes.insert(key, re);
                }
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "Regex compilation failed, treated as non-match");
                }
            }
        }
        Self { regexes }
    }

    /// 查表匹配；未编译成功或未登记的模式一律不匹配
    #[inline]
    pub fn is_match(&self, value: &str, pattern: &str, case_insensitive: bool) -> bool {
        if value.is_empty() {
            return false;
        }
        self.regexes
            .get(&(pattern, case_insensitive))
            .is_some_and(|re| re.is_match(value))
    }

    /// 按 PatternKind 匹配：字面量直接比较，正则查表
    #[inline]
    pub fn test(&self, value: &str, pattern: &str, kind: PatternKind) -> bool {
        match kind {
            PatternKind::Literal => test_pattern(value, pattern, kind),
            PatternKind::Regex => self.is_match(value, pattern, true),
        }
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

/// 测试 value 是否命中 pattern（独立调用，不依赖预编译表）
/// value 为空时恒为 false：没有证据就不能命中
pub fn test_pattern(value: &str, pattern: &str, kind: PatternKind) -> bool {
    if value.is_empty() {
        return false;
    }
    match kind {
        PatternKind::Literal => contains_ignore_case(value, pattern),
        PatternKind::Regex => regex_is_match(value, pattern, true),
    }
}

/// 单次正则匹配，每次调用都会编译；编译失败视为不匹配
pub fn regex_is_match(value: &str, pattern: &str, case_insensitive: bool) -> bool {
    match compile_regex(pattern, case_insensitive) {
        Ok(re) => re.is_match(value),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "Regex compilation failed, treated as non-match");
            false
        }
    }
}

fn compile_regex(pattern: &str, case_insensitive: bool) -> AbResult<Regex> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()?;
    Ok(re)
}

/// 忽略大小写的子串包含判断
#[inline]
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.is_ascii() && needle.is_ascii() {
        let needle = needle.as_bytes();
        return haystack
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle));
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
