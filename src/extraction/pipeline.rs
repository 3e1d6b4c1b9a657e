//! 题目提取流水线
//!
//! 文本清洗 → 题目切分 → 逐题识别选项 → QuestionSet
//!
//! 对外入口 `extract_questions` 永不返回错误：文档读取失败会被记录下来，
//! 同时返回空的题目集合，由调用方提示"未找到题目"。

use crate::config::Config;
use crate::error::{ConfigError, DocumentError};
use crate::extraction::normalizer::Normalizer;
use crate::extraction::options::{extract_record, DEFAULT_OPTION_MAX_CHARS};
use crate::extraction::segmenter::{segment, MarkerGrammar};
use crate::infrastructure::PageSource;
use crate::models::question::QuestionSet;
use crate::utils::logging::truncate_text;
use tracing::{debug, error, info};

/// 一次提取的结果
#[derive(Debug)]
pub struct Extraction {
    pub questions: QuestionSet,
    /// 文档读取失败时保留原始错误
    pub failure: Option<DocumentError>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// 题目提取器
#[derive(Debug, Clone)]
pub struct QuestionExtractor {
    normalizer: Normalizer,
    option_max_chars: usize,
    grammars: Vec<MarkerGrammar>,
}

impl Default for QuestionExtractor {
    fn default() -> Self {
        Self {
            normalizer: Normalizer::default(),
            option_max_chars: DEFAULT_OPTION_MAX_CHARS,
            grammars: MarkerGrammar::FALLBACK_ORDER.to_vec(),
        }
    }
}

impl QuestionExtractor {
    pub fn new(normalizer: Normalizer, option_max_chars: usize, grammars: Vec<MarkerGrammar>) -> Self {
        Self {
            normalizer,
            option_max_chars,
            grammars,
        }
    }

    /// 按配置构建：追加水印正则、选项长度上限、题号语法回退顺序
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let normalizer = Normalizer::with_extra_patterns(&config.extra_watermark_patterns)?;
        Ok(Self::new(
            normalizer,
            config.option_max_chars,
            config.marker_grammars.clone(),
        ))
    }

    /// 从文档中提取题目，读取失败时返回空集合并附带错误
    pub fn extract_questions(&self, source: &dyn PageSource) -> Extraction {
        match self.try_extract(source) {
            Ok(questions) => Extraction {
                questions,
                failure: None,
            },
            Err(e) => {
                error!("❌ 提取题目失败 ({}): {}", source.name(), e);
                Extraction {
                    questions: QuestionSet::empty(),
                    failure: Some(e),
                }
            }
        }
    }

    /// 从文档中提取题目，读取失败时直接返回错误
    pub fn try_extract(&self, source: &dyn PageSource) -> Result<QuestionSet, DocumentError> {
        let pages = source.extract_pages()?;
        debug!("{}: 读取到 {} 页文本", source.name(), pages.len());
        let raw = pages.join("\n");
        Ok(self.parse_text(&raw))
    }

    /// 把整份原始文本解析成题目集合
    ///
    /// 依次尝试各个题号语法，第一个得到非空结果的语法胜出
    pub fn parse_text(&self, raw: &str) -> QuestionSet {
        let text = self.normalizer.normalize(raw);
        if text.is_empty() {
            return QuestionSet::empty();
        }

        for grammar in &self.grammars {
            let spans = segment(&text, *grammar);
            if spans.is_empty() {
                debug!("题号语法 {} 未匹配到任何题目", grammar);
                continue;
            }

            let questions: QuestionSet = spans
                .iter()
                .filter_map(|span| {
                    let record = extract_record(span.text, &self.normalizer, self.option_max_chars);
                    if record.question.is_empty() {
                        debug!("跳过题干为空的题目 (题号: {:?})", span.number);
                        return None;
                    }
                    debug!(
                        "题号 {:?}: {} ({} 个选项)",
                        span.number,
                        truncate_text(&record.question, 80),
                        record.options.len()
                    );
                    Some(record)
                })
                .collect();

            if !questions.is_empty() {
                info!(
                    "✓ 使用题号语法 {} 识别出 {} 道题目",
                    grammar,
                    questions.len()
                );
                return questions;
            }
        }

        QuestionSet::empty()
    }
}
