pub mod loaders;
pub mod question;

pub use loaders::{load_all_toml_files, load_toml_to_exam_paper, save_exam_paper};
pub use question::{placeholder_options, ExamPaper, OptionLetter, QuestionRecord, QuestionSet};
