//! 检测结果结构

use serde::{Deserialize, Serialize};

/// 单个厂商的非零得分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub name: String,
    pub confidence: u8,
}

impl Detection {
    pub fn new(name: impl Into<String>, confidence: u8) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// 检测结论
/// detections 仅在两个及以上厂商命中时存在，按置信度降序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub detected: bool,
    pub provider: Option<String>,
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detections: Option<Vec<Detection>>,
}

impl Verdict {
    /// 未命中任何厂商
    pub fn undetected() -> Self {
        Self::default()
    }

    /// 排名列表，未附带时为空
    pub fn detections(&self) -> &[Detection] {
        self.detections.as_deref().unwrap_or(&[])
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.provider {
            Some(provider) => {
                write!(f, "{} ({})", provider, self.confidence)?;
                let others: Vec<String> = self
                    .detections()
                    .iter()
                    .skip(1)
                    .map(|d| format!("{} ({})", d.name, d.confidence))
                    .collect();
                if !others.is_empty() {
                    write!(f, ", also: {}", others.join(", "))?;
                }
                Ok(())
            }
            None => write!(f, "not detected"),
        }
    }
}
