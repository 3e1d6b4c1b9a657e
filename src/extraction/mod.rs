//! 题目提取层（核心）
//!
//! 单线程、同步、无共享状态：每次调用只依赖输入文本。
//!
//! ```text
//! normalizer (清洗) → segmenter (切分) → options (选项识别) → pipeline (汇总)
//! ```

pub mod normalizer;
pub mod options;
pub mod pipeline;
pub mod segmenter;

pub use normalizer::Normalizer;
pub use options::{extract_record, find_options, OptionMatch, DEFAULT_OPTION_MAX_CHARS};
pub use pipeline::{Extraction, QuestionExtractor};
pub use segmenter::{segment, MarkerGrammar, QuestionSpan};
