//! 检测器配置管理,存储所有可配置项

use serde::{Deserialize, Serialize};

use crate::error::{AbResult, AntibotError};

/// Header 名称的大小写处理策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderCase {
    /// 先精确查找，未命中再按 ASCII 忽略大小写回退
    #[default]
    Normalize,
    /// 仅按调用方给出的键精确查找
    Exact,
}

/// 检测器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    // Header 名称大小写策略
    pub header_case: HeaderCase,
    // body/url 参与匹配的最大字节数，None 表示不限制
    pub max_scan_bytes: Option<usize>,
    // 参与名称扫描与 HeaderMap 转换的最大 Header 数
    pub max_header_count: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            header_case: HeaderCase::Normalize,
            max_scan_bytes: None,
            max_header_count: 1000,
        }
    }
}

impl DetectorConfig {
    /// 从 JSON 文本加载配置，缺失字段取默认值
    pub fn from_json(json: &str) -> AbResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 扫描上限为 0 会让所有 body/url 规则失效，视为配置错误
    pub fn validate(&self) -> AbResult<()> {
        if self.max_scan_bytes == Some(0) {
            return Err(AntibotError::InvalidInput("max_scan_bytes must be greater than 0".to_string()));
        }
        if self.max_header_count == 0 {
            return Err(AntibotError::InvalidInput("max_header_count must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> DetectorConfig {
        DetectorConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: DetectorConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn header_case(mut self, header_case: HeaderCase) -> Self {
        self.config.header_case = header_case;
        self
    }

    pub fn max_scan_bytes(mut self, max_scan_bytes: Option<usize>) -> Self {
        self.config.max_scan_bytes = max_scan_bytes;
        self
    }

    pub fn max_header_count(mut self, max_header_count: usize) -> Self {
        self.config.max_header_count = max_header_count;
        self
    }

    pub fn build(self) -> DetectorConfig {
        self.config
    }
}
