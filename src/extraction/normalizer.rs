//! 文本清洗
//!
//! PDF 文本提取会把页眉、页脚、水印混进正文，必须在切分题目之前去掉，
//! 否则题目边界会被夹杂的内容破坏。

use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;

/// 默认的文件名/机构水印
///
/// 文件名水印只匹配不含空白的文件名本身，不能跨越正文
pub const DEFAULT_WATERMARK_PATTERNS: [&str; 2] = [
    r"(?i)SSC-CGL-Tier-1-Question-Paper[^\s]*?\.pdf",
    r"(?i)Adda247[^\n]*\n?",
];

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPage\s+\d+\b").expect("页码正则无效"));

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}-\d{2}-\d{4}").expect("日期正则无效"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("空白正则无效"));

/// 文本清洗器
#[derive(Debug, Clone)]
pub struct Normalizer {
    watermarks: Vec<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            watermarks: DEFAULT_WATERMARK_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

impl Normalizer {
    /// 在默认水印之外追加自定义水印正则
    pub fn with_extra_patterns(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut normalizer = Self::default();
        for pattern in patterns {
            let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            normalizer.watermarks.push(re);
        }
        Ok(normalizer)
    }

    /// 清洗文本：去水印、页码、日期，合并空白并去掉首尾空白
    ///
    /// 对已清洗过的文本再次调用结果不变
    pub fn normalize(&self, text: &str) -> String {
        let mut current = text.to_string();
        // 删除一段噪声可能拼出新的噪声，反复清理直到不再变化
        loop {
            let stripped = self.strip_noise(&current);
            if stripped == current {
                break;
            }
            current = stripped;
        }
        WHITESPACE.replace_all(&current, " ").trim().to_string()
    }

    fn strip_noise(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.watermarks {
            out = re.replace_all(&out, "").into_owned();
        }
        out = PAGE_MARKER.replace_all(&out, "").into_owned();
        DATE_TOKEN.replace_all(&out, "").into_owned()
    }
}
