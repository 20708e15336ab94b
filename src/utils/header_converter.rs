//! Header格式转换工具
use http::header::HeaderMap;
use tracing::warn;

use crate::exchange::HeaderBag;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将 HeaderMap 转换为 HeaderBag
    /// 名称统一小写（HeaderMap 本身已保证），同名多值依次追加；非 UTF-8 取值跳过
    pub fn to_header_bag(header_map: &HeaderMap, max_header_count: usize) -> HeaderBag {
        let mut bag = HeaderBag::new();

        for (iter_count, (key, value)) in header_map.iter().enumerate() {
            if iter_count >= max_header_count {
                warn!(max_header_count, "Header iteration limit reached, remaining headers ignored");
                break;
            }

            match value.to_str() {
                Ok(value_str) => bag.append(key.as_str(), value_str),
                Err(_) => continue,
            }
        }
        bag
    }

    /// 将 `name: value` 形式的文本行解析为 HeaderBag
    /// 无冒号或名称为空的行被忽略，名称转小写
    pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> HeaderBag {
        let mut bag = HeaderBag::new();
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            bag.append(name.to_ascii_lowercase(), value.trim());
        }
        bag
    }
}
