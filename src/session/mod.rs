pub mod exam_session;
pub mod report;

pub use exam_session::{format_time, AnswerMap, ExamSession, ExamState, ExamSummary};
pub use report::ExamReport;
