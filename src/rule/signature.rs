//! 签名定义：厂商名 + 按声明顺序检查的证据规则
use std::fmt;

use crate::analyzer::cookie::{has_cookie, CookieMatch};
use crate::analyzer::pattern::{CompiledPatterns, PatternKey, PatternKind};
use crate::analyzer::ScanContext;

/// 单条证据
/// Header 取值比较区分大小写；body/url 匹配忽略大小写
#[derive(Clone, Copy)]
pub enum Evidence {
    /// Header 首个取值等于给定值
    HeaderEquals(&'static str, &'static str),
    /// Header 首个取值属于给定集合
    HeaderOneOf(&'static str, &'static [&'static str]),
    /// Header 首个取值以给定前缀开头
    HeaderStartsWith(&'static str, &'static str),
    /// Header 存在且非空
    HeaderPresent(&'static str),
    /// 任一 Header 名称命中正则（忽略大小写）
    HeaderNameMatches(&'static str),
    /// Cookie 名称精确存在且值非空
    CookiePresent(&'static str),
    /// Cookie 名称前缀存在且值非空
    CookiePrefix(&'static str),
    /// 原始 Cookie Header 命中正则（区分大小写）
    CookieHeaderMatches(&'static str),
    BodyContains(&'static str),
    UrlContains(&'static str),
    UrlMatches(&'static str),
    /// 任一子证据成立
    Any(&'static [Evidence]),
    /// 全部子证据成立
    All(&'static [Evidence]),
    /// 自定义判定函数
    Predicate(fn(&ScanContext<'_>) -> bool),
}

impl Evidence {
    /// 执行匹配
    pub fn matches(&self, ctx: &ScanContext<'_>) -> bool {
        match *self {
            Evidence::HeaderEquals(name, value) => ctx.headers.first(name) == Some(value),
            Evidence::HeaderOneOf(name, values) => ctx
                .headers
                .first(name)
                .is_some_and(|v| values.contains(&v)),
            Evidence::HeaderStartsWith(name, prefix) => ctx
                .headers
                .first(name)
                .is_some_and(|v| v.starts_with(prefix)),
            Evidence::HeaderPresent(name) => ctx.headers.is_present(name),
            Evidence::HeaderNameMatches(pattern) => ctx
                .headers
                .names()
                .iter()
                .any(|name| ctx.patterns.is_match(name, pattern, true)),
            Evidence::CookiePresent(name) => has_cookie(&ctx.headers, name, CookieMatch::Exact),
            Evidence::CookiePrefix(name) => has_cookie(&ctx.headers, name, CookieMatch::Prefix),
            Evidence::CookieHeaderMatches(pattern) => ctx
                .headers
                .cookie_header()
                .is_some_and(|raw| raw.iter().any(|v| ctx.patterns.is_match(v, pattern, false))),
            Evidence::BodyContains(literal) => ctx.patterns.test(ctx.body, literal, PatternKind::Literal),
            Evidence::UrlContains(literal) => ctx.patterns.test(ctx.url, literal, PatternKind::Literal),
            Evidence::UrlMatches(pattern) => ctx.patterns.test(ctx.url, pattern, PatternKind::Regex),
            Evidence::Any(items) => items.iter().any(|e| e.matches(ctx)),
            Evidence::All(items) => items.iter().all(|e| e.matches(ctx)),
            Evidence::Predicate(f) => f(ctx),
        }
    }

    /// 收集需要预编译的正则（含大小写模式）
    fn collect_patterns(&self, out: &mut Vec<PatternKey>) {
        match *self {
            Evidence::HeaderNameMatches(pattern) | Evidence::UrlMatches(pattern) => out.push((pattern, true)),
            Evidence::CookieHeaderMatches(pattern) => out.push((pattern, false)),
            Evidence::Any(items) | Evidence::All(items) => {
                for item in items {
                    item.collect_patterns(out);
                }
            }
            _ => {}
        }
    }

    /// 描述证据规则（用于日志/调试输出）
    pub fn describe(&self) -> String {
        match self {
            Evidence::HeaderEquals(name, value) => format!("header {} == {}", name, value),
            Evidence::HeaderOneOf(name, values) => format!("header {} in {:?}", name, values),
            Evidence::HeaderStartsWith(name, prefix) => format!("header {} starts_with {}", name, prefix),
            Evidence::HeaderPresent(name) => format!("header {} present", name),
            Evidence::HeaderNameMatches(pattern) => format!("header name ~ /{}/i", pattern),
            Evidence::CookiePresent(name) => format!("cookie {} present", name),
            Evidence::CookiePrefix(name) => format!("cookie {}* present", name),
            Evidence::CookieHeaderMatches(pattern) => format!("cookie ~ /{}/", pattern),
            Evidence::BodyContains(literal) => format!("body contains {}", literal),
            Evidence::UrlContains(literal) => format!("url contains {}", literal),
            Evidence::UrlMatches(pattern) => format!("url ~ /{}/i", pattern),
            Evidence::Any(items) => join_described(items, " || "),
            Evidence::All(items) => join_described(items, " && "),
            Evidence::Predicate(_) => "predicate".to_string(),
        }
    }
}

fn join_described(items: &[Evidence], sep: &str) -> String {
    let parts: Vec<String> = items.iter().map(Evidence::describe).collect();
    format!("({})", parts.join(sep))
}

impl fmt::Debug for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// 证据规则：证据 + 命中时的置信度（1..=100）
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub evidence: Evidence,
    pub score: u8,
}

impl Rule {
    pub const fn new(evidence: Evidence, score: u8) -> Self {
        Self { evidence, score }
    }
}

/// 厂商签名
/// 规则按声明顺序检查，第一条命中的规则决定得分，不累加
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    /// 厂商名，跨版本稳定
    pub name: &'static str,
    pub rules: &'static [Rule],
}

impl Signature {
    pub const fn new(name: &'static str, rules: &'static [Rule]) -> Self {
        Self { name, rules }
    }

    /// 计算该厂商得分，0 表示未命中
    pub fn evaluate(&self, ctx: &ScanContext<'_>) -> u8 {
        for rule in self.rules {
            if rule.evidence.matches(ctx) {
                tracing::trace!(
                    vendor = self.name,
                    rule = %rule.evidence.describe(),
                    score = rule.score,
                    "signature rule matched"
                );
                return rule.score;
            }
        }
        0
    }

    /// 该签名用到的全部正则
    pub fn patterns(&self) -> Vec<PatternKey> {
        let mut out = Vec::new();
        for rule in self.rules {
            rule.evidence.collect_patterns(&mut out);
        }
        out
    }
}

/// 预编译签名库中的全部正则
pub fn compile_patterns(catalog: &[Signature]) -> CompiledPatterns {
    CompiledPatterns::from_patterns(catalog.iter().flat_map(Signature::patterns))
}
