//! 检测输入模型：Header 查询抽象、Header 容器与 HTTP 交换视图
use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use http::header::HeaderMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AbResult, AntibotError};

/// 单个 Header 名称对应的全部取值（按出现顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderValue<'a>(Vec<&'a str>);

impl<'a> HeaderValue<'a> {
    pub fn single(value: &'a str) -> Self {
        Self(vec![value])
    }

    /// 第一个取值，用于等值/前缀判断
    pub fn first(&self) -> Option<&'a str> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.iter().copied()
    }

    /// 至少有一个非空取值才算存在，空值等同于没有证据
    pub fn is_present(&self) -> bool {
        self.0.iter().any(|v| !v.is_empty())
    }
}

impl<'a> FromIterator<&'a str> for HeaderValue<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Header 查询能力抽象
/// 普通键值映射与 `http::HeaderMap` 这类带查询方法的结构统一经由此特质访问
pub trait HeaderLookup {
    /// 按名称取值，不做大小写归一
    fn get(&self, name: &str) -> Option<HeaderValue<'_>>;

    /// 全部 Header 名称
    fn names(&self) -> Vec<&str>;
}

impl HeaderLookup for () {
    fn get(&self, _name: &str) -> Option<HeaderValue<'_>> {
        None
    }

    fn names(&self) -> Vec<&str> {
        Vec::new()
    }
}

impl HeaderLookup for HeaderMap {
    fn get(&self, name: &str) -> Option<HeaderValue<'_>> {
        let value: HeaderValue<'_> = self
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if value.0.is_empty() { None } else { Some(value) }
    }

    fn names(&self) -> Vec<&str> {
        self.keys().map(|k| k.as_str()).collect()
    }
}

impl<S: BuildHasher> HeaderLookup for HashMap<String, String, S> {
    fn get(&self, name: &str) -> Option<HeaderValue<'_>> {
        HashMap::get(self, name).map(|v| HeaderValue::single(v))
    }

    fn names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

impl<S: BuildHasher> HeaderLookup for HashMap<String, Vec<String>, S> {
    fn get(&self, name: &str) -> Option<HeaderValue<'_>> {
        HashMap::get(self, name).map(|values| values.iter().map(String::as_str).collect())
    }

    fn names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }
}

/// 普通 Header 容器
/// 名称按调用方给出的原样保存，同名 Header 可多值（如多行 set-cookie）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBag {
    entries: FxHashMap<String, Vec<String>>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入 Header，覆盖同名旧值
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), vec![value.into()]);
    }

    /// 追加 Header 取值，保留同名旧值
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(name.into()).or_default().push(value.into());
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl HeaderLookup for HeaderBag {
    fn get(&self, name: &str) -> Option<HeaderValue<'_>> {
        self.entries.get(name).map(|values| values.iter().map(String::as_str).collect())
    }

    fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = HeaderBag::new();
        for (name, value) in iter {
            bag.append(name, value);
        }
        bag
    }
}

/// JSON 中 Header 值既可以是字符串，也可以是字符串数组
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for HeaderBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = FxHashMap::<String, OneOrMany>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(name, value)| match value {
                OneOrMany::One(v) => (name, vec![v]),
                OneOrMany::Many(vs) => (name, vs),
            })
            .collect();
        Ok(Self { entries })
    }
}

impl Serialize for HeaderBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}

/// 一次 HTTP 交换的只读视图，所有字段均可缺省
/// 缺省 headers 视为空映射，缺省 body/url 视为空串
#[derive(Clone, Copy)]
pub struct Exchange<'a> {
    pub headers: &'a dyn HeaderLookup,
    pub body: &'a str,
    pub url: &'a str,
}

impl<'a> Exchange<'a> {
    pub fn new() -> Self {
        Self {
            headers: &(),
            body: "",
            url: "",
        }
    }

    pub fn with_headers(mut self, headers: &'a dyn HeaderLookup) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: &'a str) -> Self {
        self.body = body;
        self
    }

    pub fn with_url(mut self, url: &'a str) -> Self {
        self.url = url;
        self
    }
}

impl Default for Exchange<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Exchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exchange")
            .field("headers", &self.headers.names())
            .field("body_len", &self.body.len())
            .field("url", &self.url)
            .finish()
    }
}

/// 可序列化的自有交换记录，供 JSON 输入与 HAR 加载使用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeRecord {
    pub headers: HeaderBag,
    pub body: String,
    pub url: String,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    headers: Option<serde_json::Value>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl ExchangeRecord {
    /// 解析 `{ "headers": {...}, "body": "...", "url": "..." }`
    /// headers 形状不受支持时直接报错，不做静默降级
    pub fn from_json(json: &str) -> AbResult<Self> {
        let raw: RawRecord = serde_json::from_str(json)?;
        let headers = match raw.headers {
            None | Some(serde_json::Value::Null) => HeaderBag::default(),
            Some(value) => HeaderBag::deserialize(value)
                .map_err(|e| AntibotError::UnsupportedHeaders(e.to_string()))?,
        };

        Ok(Self {
            headers,
            body: raw.body.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
        })
    }

    pub fn as_exchange(&self) -> Exchange<'_> {
        Exchange::new()
            .with_headers(&self.headers)
            .with_body(&self.body)
            .with_url(&self.url)
    }
}
