//! 题目切分
//!
//! 按题号标记把清洗后的文本切成一段段题目原文。题号只用于日志，
//! 顺序以文本中出现的物理顺序为准。

use crate::error::ConfigError;
use phf::phf_map;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static Q_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Q\.?\s*(\d+)").expect("题号正则无效"));

static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})[.)]\s").expect("数字题号正则无效"));

/// 题号语法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerGrammar {
    /// `Q.1`、`Q 12`、`Q3`、`q.4`（不区分大小写）
    QPrefixed,
    /// `1.`、`12)`，仅在 `Q` 题号完全缺失时作为备选
    Numbered,
}

static GRAMMAR_NAMES: phf::Map<&'static str, MarkerGrammar> = phf_map! {
    "q" => MarkerGrammar::QPrefixed,
    "q-prefixed" => MarkerGrammar::QPrefixed,
    "numeric" => MarkerGrammar::Numbered,
    "numbered" => MarkerGrammar::Numbered,
};

impl MarkerGrammar {
    /// 默认的回退顺序
    pub const FALLBACK_ORDER: [MarkerGrammar; 2] =
        [MarkerGrammar::QPrefixed, MarkerGrammar::Numbered];

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        GRAMMAR_NAMES
            .get(name.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownGrammar(name.to_string()))
    }

    fn regex(self) -> &'static Regex {
        match self {
            MarkerGrammar::QPrefixed => &*Q_MARKER,
            MarkerGrammar::Numbered => &*NUMBERED_MARKER,
        }
    }
}

impl fmt::Display for MarkerGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerGrammar::QPrefixed => write!(f, "q"),
            MarkerGrammar::Numbered => write!(f, "numeric"),
        }
    }
}

/// 单道题目的原文片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSpan<'a> {
    /// 题号标记上写的编号，不参与排序
    pub number: Option<u32>,
    /// 从本题标记结束到下一题标记开始之间的原文
    pub text: &'a str,
}

/// 按指定语法切分题目，找不到题号时返回空列表
pub fn segment(text: &str, grammar: MarkerGrammar) -> Vec<QuestionSpan<'_>> {
    let markers: Vec<_> = grammar.regex().captures_iter(text).collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let marker = caps.get(0)?;
            let end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |next| next.start());
            Some(QuestionSpan {
                number: caps.get(1).and_then(|n| n.as_str().parse().ok()),
                text: &text[marker.end()..end],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_markers() {
        assert!(segment("", MarkerGrammar::QPrefixed).is_empty());
        assert!(segment("just some text", MarkerGrammar::QPrefixed).is_empty());
    }

    #[test]
    fn test_spans_between_markers() {
        let text = "Intro Q.1 first A. x Q 2 second Q3 third";
        let spans = segment(text, MarkerGrammar::QPrefixed);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, " first A. x ");
        assert_eq!(spans[1].text, " second ");
        assert_eq!(spans[2].text, " third");
        assert_eq!(
            spans.iter().map(|s| s.number).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[test]
    fn test_physical_order_wins_over_declared_number() {
        let text = "Q.7 seven Q.2 two Q.5 five";
        let spans = segment(text, MarkerGrammar::QPrefixed);
        let texts: Vec<_> = spans.iter().map(|s| s.text.trim()).collect();
        assert_eq!(texts, vec!["seven", "two", "five"]);
        assert_eq!(spans[0].number, Some(7));
    }

    #[test]
    fn test_span_count_matches_marker_count() {
        let text: String = (1..=25).map(|k| format!("Q.{} question {} ", k, k)).collect();
        let spans = segment(&text, MarkerGrammar::QPrefixed);
        assert_eq!(spans.len(), 25);
        for (k, span) in spans.iter().enumerate() {
            assert_eq!(span.text, format!(" question {} ", k + 1));
        }
    }

    #[test]
    fn test_numbered_grammar() {
        let text = "1. Sky colour? A. Blue B. Red 2) Grass colour? A. Green B. Pink";
        let spans = segment(text, MarkerGrammar::Numbered);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Sky colour? A. Blue B. Red ");
        assert_eq!(spans[1].number, Some(2));
        assert!(segment("Pi is 3.14 today", MarkerGrammar::Numbered).is_empty());
    }

    #[test]
    fn test_lowercase_q_markers() {
        let spans = segment("q.1 first q 2 second Q3 third", MarkerGrammar::QPrefixed);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, " first ");
        assert_eq!(spans[1].number, Some(2));
    }

    #[test]
    fn test_grammar_names() {
        assert_eq!(MarkerGrammar::from_name("Q").unwrap(), MarkerGrammar::QPrefixed);
        assert_eq!(MarkerGrammar::from_name(" numeric ").unwrap(), MarkerGrammar::Numbered);
        assert!(matches!(
            MarkerGrammar::from_name("roman"),
            Err(ConfigError::UnknownGrammar(_))
        ));
    }
}
