//! 选项识别
//!
//! 在单道题目的原文里找出 `A.`/`B)`/`C:`/`D ` 形式的选项，剩下的部分作为题干。
//! 选项文本向后延伸到下一个选项字母、`Ans` 关键字、`Q.` 或片段结尾为止（取最短）。
//!
//! 已知局限：选项文本内部出现的大写 A-D 字母后跟分隔符时，会提前截断选项
//! 或把两个选项合并。这里保持该近似行为，不做修正。

use crate::extraction::normalizer::Normalizer;
use crate::models::question::{OptionLetter, QuestionRecord};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// 单个选项最多保留的字符数
pub const DEFAULT_OPTION_MAX_CHARS: usize = 200;

static OPTION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-D][.:)\s]\s*").expect("选项正则无效"));

static NEXT_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+[A-D][.:)\s]").expect("选项边界正则无效"));

static TRAILING_ANS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\bAns\s*$").expect("Ans 正则无效"));

/// 原文中识别出的一个选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionMatch<'a> {
    pub letter: OptionLetter,
    /// 选项文本（未清洗）
    pub text: &'a str,
}

/// 按出现顺序找出片段中的所有选项
pub fn find_options(span: &str) -> Vec<OptionMatch<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < span.len() {
        let Some(start) = OPTION_START.find_at(span, pos) else {
            break;
        };
        let letter = span[start.start()..]
            .chars()
            .next()
            .and_then(OptionLetter::from_char);

        match (letter, option_text_end(span, start.end())) {
            (Some(letter), Some(end)) => {
                found.push(OptionMatch {
                    letter,
                    text: &span[start.end()..end],
                });
                pos = end;
            }
            // 字母本身是 ASCII，跳过一个字节即可
            _ => pos = start.start() + 1,
        }
    }

    found
}

/// 从 `text_start` 开始找最短的选项文本结尾，文本至少一个字符且不跨行
fn option_text_end(span: &str, text_start: usize) -> Option<usize> {
    for (offset, ch) in span[text_start..].char_indices() {
        if ch == '\n' {
            return None;
        }
        let end = text_start + offset + ch.len_utf8();
        if is_option_boundary(&span[end..]) {
            return Some(end);
        }
    }
    None
}

fn is_option_boundary(rest: &str) -> bool {
    rest.is_empty()
        || rest == "\n"
        || rest.starts_with("Ans")
        || rest.starts_with("Q.")
        || NEXT_OPTION.is_match(rest)
}

/// 把一段题目原文解析成题目记录
///
/// 识别出至少两个不同的选项字母时，从原文中删去选项得到题干；
/// 否则整段作为题干并使用占位选项。
pub fn extract_record(span: &str, normalizer: &Normalizer, max_chars: usize) -> QuestionRecord {
    let span = span.trim();
    let matches = find_options(span);

    let distinct: BTreeSet<OptionLetter> = matches.iter().map(|m| m.letter).collect();
    if distinct.len() < 2 {
        return QuestionRecord::with_placeholder_options(normalizer.normalize(span));
    }

    let mut stem = span.to_string();
    for m in &matches {
        stem = remove_option(&stem, m);
    }
    let stem = normalizer.normalize(&stem);
    let stem = TRAILING_ANS.replace(&stem, "").into_owned();

    // 同一字母出现多次时以最后一次为准
    let options: BTreeMap<OptionLetter, String> = matches
        .iter()
        .map(|m| {
            let text: String = normalizer.normalize(m.text).chars().take(max_chars).collect();
            (m.letter, text)
        })
        .collect();

    QuestionRecord::new(stem, options)
}

/// 删除题干中所有 `字母 + 分隔符 + 选项文本` 的出现
fn remove_option(stem: &str, m: &OptionMatch<'_>) -> String {
    let pattern = format!(r"{}[.:)\s]\s*{}", m.letter, regex::escape(m.text));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(stem, "").into_owned(),
        // 选项过长时正则可能超出大小限制，退回到字面删除
        Err(_) => stem.replace(m.text, ""),
    }
}
