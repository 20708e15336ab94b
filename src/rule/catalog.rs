//! 内置厂商签名库
//! 声明顺序即优先级：同分时先声明者胜出
//! 每个厂商的规则按声明顺序检查，第一条命中的规则决定得分：
//! 只有该厂商能产生的取值 → 100；厂商下发但可被伪造的 Cookie → 80~95；body/url 通用子串 → 80~90
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::signature::{compile_patterns, Evidence::*, Rule, Signature};
use crate::analyzer::CompiledPatterns;

pub static DEFAULT_CATALOG: &[Signature] = &[
    // https://developers.cloudflare.com/cloudflare-challenges/challenge-types/challenge-pages/detect-response/
    Signature::new(
        "cloudflare",
        &[
            Rule::new(HeaderEquals("cf-mitigated", "challenge"), 100),
            Rule::new(
                All(&[HeaderPresent("cf-ray"), HeaderEquals("server", "cloudflare")]),
                85,
            ),
        ],
    ),
    Signature::new(
        "vercel",
        &[Rule::new(HeaderEquals("x-vercel-mitigated", "challenge"), 100)],
    ),
    // https://techdocs.akamai.com/property-mgr/docs/return-cache-status
    Signature::new(
        "akamai",
        &[
            Rule::new(HeaderStartsWith("akamai-cache-status", "Error"), 100),
            Rule::new(CookiePresent("_abck"), 90),
            Rule::new(CookiePresent("ak_bmsc"), 85),
            Rule::new(
                Any(&[HeaderPresent("akamai-grn"), HeaderPresent("x-akamai-session-info")]),
                80,
            ),
        ],
    ),
    // https://docs.datadome.co/reference/validate-request
    Signature::new(
        "datadome",
        &[
            Rule::new(HeaderOneOf("x-dd-b", &["1", "2"]), 100),
            Rule::new(CookiePresent("datadome"), 95),
            Rule::new(HeaderPresent("x-datadome"), 90),
        ],
    ),
    Signature::new(
        "perimeterx",
        &[
            Rule::new(HeaderPresent("x-px-authorization"), 100),
            Rule::new(CookiePresent("_px3"), 100),
            Rule::new(CookiePresent("_px2"), 95),
            Rule::new(Any(&[CookiePresent("_pxhd"), CookiePresent("_pxvid")]), 85),
            Rule::new(BodyContains("window._pxAppId"), 90),
        ],
    ),
    Signature::new(
        "shapesecurity",
        &[
            // 动态 Header：x-<8位>-<abcdfz>
            Rule::new(HeaderNameMatches(r"^x-[a-z0-9]{8}-[abcdfz]$"), 100),
            // 8 位 Cookie 名，值中带 |1|0| 或 |1|1|
            Rule::new(CookieHeaderMatches(r"[A-Za-z0-9]{8}=[^;]*\|1\|[01]\|"), 95),
            Rule::new(BodyContains("shapesecurity"), 85),
        ],
    ),
    Signature::new(
        "kasada",
        &[
            Rule::new(Any(&[HeaderPresent("x-kasada"), HeaderPresent("x-kasada-challenge")]), 90),
            Rule::new(CookiePresent("kas.js"), 95),
            Rule::new(CookiePresent("kas_challenge"), 90),
            Rule::new(Any(&[BodyContains("__kasada"), BodyContains("kasada.js")]), 85),
        ],
    ),
    Signature::new(
        "imperva",
        &[
            Rule::new(Any(&[CookiePrefix("visid_incap"), CookiePrefix("incap_ses")]), 100),
            Rule::new(Any(&[HeaderEquals("x-cdn", "Incapsula"), HeaderPresent("x-iinfo")]), 95),
            Rule::new(Any(&[BodyContains("incapsula"), BodyContains("imperva")]), 85),
        ],
    ),
    Signature::new(
        "recaptcha",
        &[
            Rule::new(Any(&[UrlContains("recaptcha/api"), UrlMatches(r"google\.com/recaptcha")]), 100),
            Rule::new(BodyContains("grecaptcha"), 100),
            Rule::new(BodyContains("g-recaptcha"), 95),
            Rule::new(BodyContains("recaptcha"), 85),
        ],
    ),
    Signature::new(
        "hcaptcha",
        &[
            Rule::new(UrlMatches(r"hcaptcha\.com"), 100),
            Rule::new(BodyContains("hcaptcha"), 100),
            Rule::new(BodyContains("h-captcha"), 95),
        ],
    ),
    // Arkose Labs
    Signature::new(
        "funcaptcha",
        &[
            Rule::new(Any(&[UrlMatches(r"arkoselabs\.com"), UrlContains("funcaptcha")]), 100),
            Rule::new(Any(&[BodyContains("funcaptcha"), BodyContains("arkose")]), 95),
        ],
    ),
    Signature::new(
        "geetest",
        &[
            Rule::new(UrlMatches(r"geetest\.com"), 100),
            Rule::new(BodyContains("geetest"), 95),
            Rule::new(BodyContains("gt.js"), 90),
        ],
    ),
    Signature::new(
        "cloudflare-turnstile",
        &[
            Rule::new(UrlMatches(r"challenges\.cloudflare\.com/turnstile"), 100),
            Rule::new(BodyContains("cf-turnstile"), 100),
            Rule::new(BodyContains("turnstile"), 95),
        ],
    ),
    Signature::new(
        "aws-waf",
        &[
            Rule::new(CookiePresent("aws-waf-token"), 100),
            Rule::new(Any(&[HeaderPresent("x-amzn-waf-action"), HeaderPresent("x-amzn-requestid")]), 90),
            Rule::new(BodyContains("aws-waf"), 85),
        ],
    ),
];

/// 内置签名库的预编译正则，首次使用时编译一次
static DEFAULT_PATTERNS: Lazy<Arc<CompiledPatterns>> =
    Lazy::new(|| Arc::new(compile_patterns(DEFAULT_CATALOG)));

pub fn default_patterns() -> Arc<CompiledPatterns> {
    Arc::clone(&DEFAULT_PATTERNS)
}

/// 按厂商名查找内置签名
pub fn find_signature(name: &str) -> Option<&'static Signature> {
    DEFAULT_CATALOG.iter().find(|sig| sig.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ScanContext;
    use crate::config::DetectorConfig;
    use crate::exchange::{Exchange, HeaderBag};
    use rustc_hash::FxHashSet;

    fn score(vendor: &str, headers: &[(&str, &str)], body: &str, url: &str) -> u8 {
        let headers: HeaderBag = headers.iter().copied().collect();
        let exchange = Exchange::new().with_headers(&headers).with_body(body).with_url(url);
        let patterns = default_patterns();
        let ctx = ScanContext::new(&exchange, &DetectorConfig::default(), &patterns);
        find_signature(vendor).unwrap().evaluate(&ctx)
    }

    #[test]
    fn test_catalog_order_and_names() {
        let names: Vec<&str> = DEFAULT_CATALOG.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "cloudflare", "vercel", "akamai", "datadome", "perimeterx", "shapesecurity",
                "kasada", "imperva", "recaptcha", "hcaptcha", "funcaptcha", "geetest",
                "cloudflare-turnstile", "aws-waf",
            ]
        );
        let unique: FxHashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_rule_scores_in_range() {
        for sig in DEFAULT_CATALOG {
            assert!(!sig.rules.is_empty(), "{} has no rules", sig.name);
            for rule in sig.rules {
                assert!((1..=100).contains(&rule.score));
            }
        }
    }

    #[test]
    fn test_default_patterns_all_compile() {
        let declared: FxHashSet<_> = DEFAULT_CATALOG.iter().flat_map(Signature::patterns).collect();
        assert_eq!(declared.len(), 7);
        assert_eq!(default_patterns().len(), declared.len());
    }

    #[test]
    fn test_cloudflare() {
        assert_eq!(score("cloudflare", &[("cf-mitigated", "challenge")], "", ""), 100);
        assert_eq!(score("cloudflare", &[("cf-ray", "abc"), ("server", "cloudflare")], "", ""), 85);
        assert_eq!(score("cloudflare", &[("cf-ray", "abc")], "", ""), 0);
        assert_eq!(score("cloudflare", &[("cf-mitigated", "managed")], "", ""), 0);
    }

    #[test]
    fn test_akamai() {
        assert_eq!(score("akamai", &[("akamai-cache-status", "Error from child")], "", ""), 100);
        assert_eq!(score("akamai", &[("akamai-cache-status", "HIT")], "", ""), 0);
        assert_eq!(score("akamai", &[("cookie", "_abck=test123")], "", ""), 90);
        assert_eq!(score("akamai", &[("cookie", "ak_bmsc=x")], "", ""), 85);
        assert_eq!(score("akamai", &[("akamai-grn", "0.1")], "", ""), 80);
        assert_eq!(score("akamai", &[("x-akamai-session-info", "name=x")], "", ""), 80);
    }

    #[test]
    fn test_datadome() {
        assert_eq!(score("datadome", &[("x-dd-b", "1")], "", ""), 100);
        assert_eq!(score("datadome", &[("x-dd-b", "2")], "", ""), 100);
        assert_eq!(score("datadome", &[("x-dd-b", "3")], "", ""), 0);
        assert_eq!(score("datadome", &[("set-cookie", "datadome=abc; Path=/")], "", ""), 95);
        assert_eq!(score("datadome", &[("x-datadome", "protected")], "", ""), 90);
    }

    #[test]
    fn test_perimeterx() {
        assert_eq!(score("perimeterx", &[("x-px-authorization", "3")], "", ""), 100);
        assert_eq!(score("perimeterx", &[("cookie", "_px3=abc")], "", ""), 100);
        assert_eq!(score("perimeterx", &[("cookie", "_px2=abc")], "", ""), 95);
        assert_eq!(score("perimeterx", &[("cookie", "_pxvid=abc")], "", ""), 85);
        assert_eq!(score("perimeterx", &[], r#"<script>window._pxAppId = "PX123";</script>"#, ""), 90);
        // Cookie 规则先于 body 规则检查
        assert_eq!(score("perimeterx", &[("cookie", "_pxhd=abc")], "window._pxAppId", ""), 85);
    }

    #[test]
    fn test_shapesecurity() {
        assert_eq!(score("shapesecurity", &[("x-abc12345-a", "test")], "", ""), 100);
        assert_eq!(score("shapesecurity", &[("x-abc12345-e", "test")], "", ""), 0);
        assert_eq!(score("shapesecurity", &[("cookie", "shape123=data|1|0|test")], "", ""), 95);
        assert_eq!(score("shapesecurity", &[("cookie", "shape123=data|2|0|test")], "", ""), 0);
        assert_eq!(score("shapesecurity", &[], "cdn.shapesecurity.com", ""), 85);
    }

    #[test]
    fn test_kasada() {
        assert_eq!(score("kasada", &[("x-kasada", "1")], "", ""), 90);
        assert_eq!(score("kasada", &[("x-kasada-challenge", "1")], "", ""), 90);
        assert_eq!(score("kasada", &[("cookie", "kas.js=test123")], "", ""), 95);
        assert_eq!(score("kasada", &[("cookie", "kas_challenge=1")], "", ""), 90);
        assert_eq!(score("kasada", &[], "<script src=/149e9513/kasada.js>", ""), 85);
        // Header 规则先于 kas.js Cookie 规则检查
        assert_eq!(score("kasada", &[("x-kasada", "1"), ("cookie", "kas.js=1")], "", ""), 90);
    }

    #[test]
    fn test_imperva() {
        assert_eq!(score("imperva", &[("cookie", "visid_incap_12345=test")], "", ""), 100);
        assert_eq!(score("imperva", &[("cookie", "incap_ses_99_1=test")], "", ""), 100);
        assert_eq!(score("imperva", &[("x-cdn", "Incapsula")], "", ""), 95);
        assert_eq!(score("imperva", &[("x-cdn", "incapsula")], "", ""), 0);
        assert_eq!(score("imperva", &[("x-iinfo", "1-2-3")], "", ""), 95);
        assert_eq!(score("imperva", &[], "Powered by Imperva", ""), 85);
    }

    #[test]
    fn test_captcha_vendors() {
        assert_eq!(score("recaptcha", &[], "", "https://www.google.com/recaptcha/api.js"), 100);
        assert_eq!(score("recaptcha", &[], "<script>grecaptcha.execute();</script>", ""), 100);
        assert_eq!(score("recaptcha", &[], r#"<div class="g-recaptcha"></div>"#, ""), 95);
        assert_eq!(score("recaptcha", &[], "recaptcha", ""), 85);

        assert_eq!(score("hcaptcha", &[], "", "https://hcaptcha.com/captcha/v1"), 100);
        assert_eq!(score("hcaptcha", &[], r#"<div class="h-captcha"></div>"#, ""), 95);
        assert_eq!(score("hcaptcha", &[], "hcaptcha.render()", ""), 100);

        assert_eq!(score("funcaptcha", &[], "", "https://client-api.arkoselabs.com/fc/gc/"), 100);
        assert_eq!(score("funcaptcha", &[], "", "https://example.com/funcaptcha"), 100);
        assert_eq!(score("funcaptcha", &[], "Arkose Labs", ""), 95);

        assert_eq!(score("geetest", &[], "", "https://api.geetest.com/ajax.php"), 100);
        assert_eq!(score("geetest", &[], "initGeetest()", ""), 95);
        assert_eq!(score("geetest", &[], "/static/gt.js", ""), 90);

        assert_eq!(score("cloudflare-turnstile", &[], "", "https://challenges.cloudflare.com/turnstile/v0/api.js"), 100);
        assert_eq!(score("cloudflare-turnstile", &[], r#"<div class="cf-turnstile"></div>"#, ""), 100);
        assert_eq!(score("cloudflare-turnstile", &[], "turnstile.render()", ""), 95);
    }

    #[test]
    fn test_aws_waf() {
        assert_eq!(score("aws-waf", &[("cookie", "aws-waf-token=test123")], "", ""), 100);
        assert_eq!(score("aws-waf", &[("x-amzn-waf-action", "CHALLENGE")], "", ""), 90);
        assert_eq!(score("aws-waf", &[("x-amzn-requestid", "abc")], "", ""), 90);
        assert_eq!(score("aws-waf", &[], "aws-waf-token.js", ""), 85);
    }
}
