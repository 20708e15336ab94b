use crate::analyzer::header::HeaderAccessor;

/// Cookie 名称匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieMatch {
    /// 名称完全一致（区分大小写）
    Exact,
    /// 名称前缀一致（忽略大小写），用于带随机后缀的 Cookie，如 visid_incap_<id>
    Prefix,
}

/// 从 cookie / set-cookie 中提取指定 Cookie 的值
/// 多行取值依次扫描，返回第一个命中的值；无 Cookie Header 或无命中返回 None
pub fn get_cookie<'a>(headers: &HeaderAccessor<'a>, name: &str, mode: CookieMatch) -> Option<&'a str> {
    let cookie_header = headers.cookie_header()?;

    match mode {
        // name=value 中 value 取到 ';' 为止，去掉前导空白
        CookieMatch::Exact => cookie_header.iter().find_map(|raw| {
            raw.split(';').find_map(|pair| {
                let (cookie_name, value) = pair.split_once('=')?;
                (cookie_name.trim() == name).then(|| value.trim_start())
            })
        }),
        CookieMatch::Prefix => {
            let prefix = name.to_lowercase();
            cookie_header.iter().find_map(|raw| {
                raw.split(';').map(str::trim).find_map(|pair| {
                    let mut parts = pair.split('=');
                    let cookie_name = parts.next().unwrap_or("");
                    if !cookie_name.is_empty() && cookie_name.to_lowercase().starts_with(&prefix) {
                        Some(parts.next().unwrap_or(""))
                    } else {
                        None
                    }
                })
            })
        }
    }
}

/// Cookie 存在且取值非空才算证据
#[inline]
pub fn has_cookie(headers: &HeaderAccessor<'_>, name: &str, mode: CookieMatch) -> bool {
    get_cookie(headers, name, mode).is_some_and(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderCase;
    use crate::exchange::HeaderBag;

    fn bag(pairs: &[(&str, &str)]) -> HeaderBag {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_exact_cookie() {
        let headers = bag(&[("cookie", "foo=bar; _abck=test123; other=1")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "_abck", CookieMatch::Exact), Some("test123"));
        assert_eq!(get_cookie(&accessor, "foo", CookieMatch::Exact), Some("bar"));
        assert_eq!(get_cookie(&accessor, "_ab", CookieMatch::Exact), None);
        assert_eq!(get_cookie(&accessor, "_ABCK", CookieMatch::Exact), None);
    }

    #[test]
    fn test_exact_cookie_name_is_literal() {
        let headers = bag(&[("cookie", "kasxjs=1")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "kas.js", CookieMatch::Exact), None);

        let headers = bag(&[("cookie", "kas.js=1")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "kas.js", CookieMatch::Exact), Some("1"));
    }

    #[test]
    fn test_exact_cookie_value_keeps_inner_equals() {
        let headers = bag(&[("cookie", "a=1;  _px3 = v=w==; b")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "_px3", CookieMatch::Exact), Some("v=w=="));
        assert_eq!(get_cookie(&accessor, "b", CookieMatch::Exact), None);
    }

    #[test]
    fn test_set_cookie_lines() {
        let headers = bag(&[
            ("set-cookie", "session=1; Path=/; HttpOnly"),
            ("set-cookie", "datadome=abc; Max-Age=31536000; Domain=.example.com"),
        ]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "datadome", CookieMatch::Exact), Some("abc"));
    }

    #[test]
    fn test_prefix_cookie() {
        let headers = bag(&[("cookie", "a=1; Visid_Incap_12345=xyz=tail; b=2")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "visid_incap", CookieMatch::Prefix), Some("xyz"));
        assert_eq!(get_cookie(&accessor, "incap_ses", CookieMatch::Prefix), None);
    }

    #[test]
    fn test_prefix_cookie_without_value() {
        let headers = bag(&[("cookie", "incap_ses_1")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "incap_ses", CookieMatch::Prefix), Some(""));
        assert!(!has_cookie(&accessor, "incap_ses", CookieMatch::Prefix));
    }

    #[test]
    fn test_empty_cookie_value_is_not_evidence() {
        let headers = bag(&[("cookie", "_abck=; ak_bmsc=v")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert!(!has_cookie(&accessor, "_abck", CookieMatch::Exact));
        assert!(has_cookie(&accessor, "ak_bmsc", CookieMatch::Exact));
    }

    #[test]
    fn test_no_cookie_header() {
        let headers = bag(&[("server", "nginx")]);
        let accessor = HeaderAccessor::new(&headers, HeaderCase::Normalize);
        assert_eq!(get_cookie(&accessor, "_abck", CookieMatch::Exact), None);
    }
}
