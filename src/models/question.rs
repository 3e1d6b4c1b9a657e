use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// 选项字母，只允许 A-D
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }

    /// 从大写字母解析（PDF 文本中的选项标记）
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            _ => None,
        }
    }

    /// 解析用户输入，大小写均可
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c.to_ascii_uppercase()),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 以字符串形式序列化，这样才能作为 TOML/JSON 的表键
impl Serialize for OptionLetter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionLetter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        OptionLetter::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("无效的选项字母: {}", s)))
    }
}

/// 单道选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: BTreeMap<OptionLetter, String>,
}

impl QuestionRecord {
    pub fn new(question: impl Into<String>, options: BTreeMap<OptionLetter, String>) -> Self {
        Self {
            question: question.into(),
            options,
        }
    }

    /// 使用占位选项创建题目（未识别出结构化选项时）
    pub fn with_placeholder_options(question: impl Into<String>) -> Self {
        Self::new(question, placeholder_options())
    }

    pub fn has_placeholder_options(&self) -> bool {
        self.options == placeholder_options()
    }

    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(&letter).map(String::as_str)
    }

    pub fn letters(&self) -> impl Iterator<Item = OptionLetter> + '_ {
        self.options.keys().copied()
    }
}

/// 固定的四项占位选项 `{A: "Option A", ..., D: "Option D"}`
pub fn placeholder_options() -> BTreeMap<OptionLetter, String> {
    OptionLetter::ALL
        .iter()
        .map(|letter| (*letter, format!("Option {}", letter)))
        .collect()
}

/// 按原文出现顺序排列的题目集合，创建后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<QuestionRecord>);

impl QuestionSet {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuestionRecord> {
        self.0.iter()
    }

    /// 退化为占位选项的题目数量
    pub fn placeholder_count(&self) -> usize {
        self.0.iter().filter(|q| q.has_placeholder_options()).count()
    }
}

impl From<Vec<QuestionRecord>> for QuestionSet {
    fn from(records: Vec<QuestionRecord>) -> Self {
        Self(records)
    }
}

impl FromIterator<QuestionRecord> for QuestionSet {
    fn from_iter<I: IntoIterator<Item = QuestionRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a QuestionRecord;
    type IntoIter = std::slice::Iter<'a, QuestionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 导出到 TOML 的试卷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPaper {
    pub name: String,
    pub source_file: String,
    pub extracted_at: String,
    pub questions: QuestionSet,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl ExamPaper {
    pub fn new(name: impl Into<String>, source_file: impl Into<String>, questions: QuestionSet) -> Self {
        Self {
            name: name.into(),
            source_file: source_file.into(),
            extracted_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            questions,
            file_path: None,
        }
    }

    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_options_are_fixed() {
        let record = QuestionRecord::with_placeholder_options("What is this?");
        assert_eq!(record.options.len(), 4);
        assert_eq!(record.option(OptionLetter::A), Some("Option A"));
        assert_eq!(record.option(OptionLetter::D), Some("Option D"));
        assert!(record.has_placeholder_options());
    }

    #[test]
    fn test_option_letter_parse() {
        assert_eq!(OptionLetter::parse("b"), Some(OptionLetter::B));
        assert_eq!(OptionLetter::parse(" D "), Some(OptionLetter::D));
        assert_eq!(OptionLetter::parse("E"), None);
        assert_eq!(OptionLetter::parse("AB"), None);
        assert_eq!(OptionLetter::from_char('a'), None);
    }

    #[test]
    fn test_record_serializes_letters_as_keys() {
        let mut options = BTreeMap::new();
        options.insert(OptionLetter::B, "4".to_string());
        options.insert(OptionLetter::A, "3".to_string());
        let record = QuestionRecord::new("What is 2+2?", options);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["options"]["A"], "3");
        assert_eq!(json["options"]["B"], "4");

        let back: QuestionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
