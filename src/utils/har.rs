//! HAR 文件加载：取第一条记录的响应 Header、响应体与请求 URL
use std::path::Path;

use serde::Deserialize;

use crate::error::{AbResult, AntibotError};
use crate::exchange::{ExchangeRecord, HeaderBag};

#[derive(Deserialize)]
struct HarDocument {
    log: HarLog,
}

#[derive(Deserialize)]
struct HarLog {
    #[serde(default)]
    entries: Vec<HarEntry>,
}

#[derive(Deserialize)]
struct HarEntry {
    #[serde(default)]
    request: Option<HarRequest>,
    response: HarResponse,
}

#[derive(Deserialize)]
struct HarRequest {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct HarResponse {
    #[serde(default)]
    headers: Vec<HarHeader>,
    #[serde(default)]
    content: Option<HarContent>,
}

#[derive(Deserialize)]
struct HarHeader {
    name: String,
    value: String,
}

#[derive(Deserialize)]
struct HarContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// HAR 加载器
pub struct HarLoader;

impl HarLoader {
    /// 从 HAR 文本解析
    pub fn parse(har: &str) -> AbResult<ExchangeRecord> {
        let document: HarDocument =
            serde_json::from_str(har).map_err(|e| AntibotError::HarParseError(e.to_string()))?;

        let entry = document
            .log
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| AntibotError::HarParseError("HAR log has no entries".to_string()))?;

        // 同名 Header（多行 set-cookie）依次追加而非覆盖
        let headers: HeaderBag = entry
            .response
            .headers
            .into_iter()
            .map(|h| (h.name, h.value))
            .collect();

        // base64 编码的响应体不参与文本匹配
        let body = entry
            .response
            .content
            .filter(|c| !c.encoding.as_deref().is_some_and(|e| e.eq_ignore_ascii_case("base64")))
            .and_then(|c| c.text)
            .unwrap_or_default();

        let url = entry.request.map(|r| r.url).unwrap_or_default();

        Ok(ExchangeRecord { headers, body, url })
    }

    /// 从 HAR 文件加载
    pub fn load(path: impl AsRef<Path>) -> AbResult<ExchangeRecord> {
        let har = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&har)
    }
}
