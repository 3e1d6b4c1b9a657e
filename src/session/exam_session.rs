//! 限时练习会话
//!
//! 会话是一个不可变的值：每个状态转换都消耗旧值并返回新值，
//! 时间由调用方传入，会话本身不读取时钟。
//!
//! ```text
//! Setup --start_exam--> InProgress --finish / tick(超时)--> Completed --reset--> Setup
//! ```

use crate::config::{MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::error::SessionError;
use crate::models::question::{OptionLetter, QuestionRecord, QuestionSet};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;

/// 题目索引（从0开始） → 所选字母
pub type AnswerMap = BTreeMap<usize, OptionLetter>;

/// 会话状态
#[derive(Debug, Clone, PartialEq)]
pub enum ExamState {
    Setup,
    InProgress {
        started_at: DateTime<Local>,
        current: usize,
    },
    Completed {
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        timed_out: bool,
    },
}

impl ExamState {
    pub fn name(&self) -> &'static str {
        match self {
            ExamState::Setup => "Setup",
            ExamState::InProgress { .. } => "InProgress",
            ExamState::Completed { .. } => "Completed",
        }
    }
}

/// 练习统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSummary {
    pub answered: usize,
    pub total: usize,
    pub completion_percent: f64,
    pub duration_minutes: u32,
    /// 仅在完成后有值
    pub elapsed_seconds: Option<i64>,
}

/// 限时练习会话
#[derive(Debug, Clone, PartialEq)]
pub struct ExamSession {
    questions: QuestionSet,
    duration_minutes: u32,
    answers: AnswerMap,
    state: ExamState,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExamSession {
    pub fn new() -> Self {
        Self {
            questions: QuestionSet::empty(),
            duration_minutes: 0,
            answers: AnswerMap::new(),
            state: ExamState::Setup,
        }
    }

    // ========== 状态转换 ==========

    /// 开始考试，题目为空或时长超出 [1, 180] 分钟时拒绝
    pub fn start_exam(
        self,
        questions: QuestionSet,
        duration_minutes: u32,
        now: DateTime<Local>,
    ) -> Result<Self, SessionError> {
        self.expect_state(matches!(self.state, ExamState::Setup), "start_exam")?;

        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
            return Err(SessionError::InvalidDuration {
                minutes: duration_minutes,
                min: MIN_DURATION_MINUTES,
                max: MAX_DURATION_MINUTES,
            });
        }

        Ok(Self {
            questions,
            duration_minutes,
            answers: AnswerMap::new(),
            state: ExamState::InProgress {
                started_at: now,
                current: 0,
            },
        })
    }

    /// 记录第 `index` 题的答案，再次作答会覆盖
    pub fn submit_answer(mut self, index: usize, letter: OptionLetter) -> Result<Self, SessionError> {
        self.expect_state(self.is_in_progress(), "submit_answer")?;

        let question = self.question_at(index)?;
        if question.option(letter).is_none() {
            return Err(SessionError::UnknownOption {
                index,
                letter: letter.to_string(),
            });
        }

        self.answers.insert(index, letter);
        Ok(self)
    }

    /// 下一题，已在最后一题时保持不变
    pub fn advance(self) -> Result<Self, SessionError> {
        let current = self.current_index().ok_or(SessionError::WrongState {
            state: self.state.name(),
            action: "advance",
        })?;
        let last = self.questions.len() - 1;
        self.jump_to((current + 1).min(last))
    }

    /// 上一题，已在第一题时保持不变
    pub fn go_back(self) -> Result<Self, SessionError> {
        let current = self.current_index().ok_or(SessionError::WrongState {
            state: self.state.name(),
            action: "go_back",
        })?;
        self.jump_to(current.saturating_sub(1))
    }

    /// 跳转到指定题目
    pub fn jump_to(mut self, index: usize) -> Result<Self, SessionError> {
        self.expect_state(self.is_in_progress(), "jump_to")?;
        self.question_at(index)?;

        if let ExamState::InProgress { current, .. } = &mut self.state {
            *current = index;
        }
        Ok(self)
    }

    /// 交卷
    pub fn finish(mut self, now: DateTime<Local>) -> Result<Self, SessionError> {
        let ExamState::InProgress { started_at, .. } = self.state else {
            return Err(SessionError::WrongState {
                state: self.state.name(),
                action: "finish",
            });
        };
        self.state = ExamState::Completed {
            started_at,
            finished_at: now,
            timed_out: false,
        };
        Ok(self)
    }

    /// 检查计时器，时间用完时自动交卷
    pub fn tick(mut self, now: DateTime<Local>) -> Self {
        if let ExamState::InProgress { started_at, .. } = self.state {
            if self.time_left_seconds(now) == 0 {
                self.state = ExamState::Completed {
                    started_at,
                    finished_at: now,
                    timed_out: true,
                };
            }
        }
        self
    }

    /// 放弃当前会话，回到初始状态（PracticeFlow 的 `r` 命令据此重新开始）
    pub fn reset(self) -> Self {
        Self::new()
    }

    // ========== 查询 ==========

    pub fn state(&self) -> &ExamState {
        &self.state
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self.state, ExamState::InProgress { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, ExamState::Completed { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            ExamState::InProgress { current, .. } => Some(current),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    /// 剩余秒数，不小于0
    pub fn time_left_seconds(&self, now: DateTime<Local>) -> i64 {
        let total = i64::from(self.duration_minutes) * 60;
        let elapsed = match &self.state {
            ExamState::Setup => 0,
            ExamState::InProgress { started_at, .. } => (now - *started_at).num_seconds(),
            ExamState::Completed {
                started_at,
                finished_at,
                ..
            } => (*finished_at - *started_at).num_seconds(),
        };
        (total - elapsed).max(0)
    }

    pub fn summary(&self) -> ExamSummary {
        let answered = self.answers.len();
        let total = self.questions.len();
        let completion_percent = if total > 0 {
            answered as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        let elapsed_seconds = match &self.state {
            ExamState::Completed {
                started_at,
                finished_at,
                ..
            } => Some((*finished_at - *started_at).num_seconds()),
            _ => None,
        };

        ExamSummary {
            answered,
            total,
            completion_percent,
            duration_minutes: self.duration_minutes,
            elapsed_seconds,
        }
    }

    fn question_at(&self, index: usize) -> Result<&QuestionRecord, SessionError> {
        self.questions.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            max_index: self.questions.len().saturating_sub(1),
        })
    }

    fn expect_state(&self, ok: bool, action: &'static str) -> Result<(), SessionError> {
        if ok {
            Ok(())
        } else {
            Err(SessionError::WrongState {
                state: self.state.name(),
                action,
            })
        }
    }
}

/// 把秒数格式化为 `MM:SS`
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn at(minute: u32, second: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 1, 10, minute, second)
            .single()
            .unwrap()
    }

    fn two_questions() -> QuestionSet {
        let mut options = BTreeMap::new();
        options.insert(OptionLetter::A, "Paris".to_string());
        options.insert(OptionLetter::B, "Rome".to_string());
        QuestionSet::from(vec![
            QuestionRecord::new("Capital of France?", options),
            QuestionRecord::with_placeholder_options("Describe the water cycle."),
        ])
    }

    fn started() -> ExamSession {
        ExamSession::new()
            .start_exam(two_questions(), 30, at(0, 0))
            .unwrap()
    }

    #[test]
    fn test_start_requires_questions() {
        let err = ExamSession::new()
            .start_exam(QuestionSet::empty(), 30, at(0, 0))
            .unwrap_err();
        assert_eq!(err, SessionError::NoQuestions);
    }

    #[test]
    fn test_start_rejects_bad_duration() {
        for minutes in [0, 181] {
            let err = ExamSession::new()
                .start_exam(two_questions(), minutes, at(0, 0))
                .unwrap_err();
            assert!(matches!(err, SessionError::InvalidDuration { .. }));
        }
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let err = started().start_exam(two_questions(), 30, at(1, 0)).unwrap_err();
        assert!(matches!(err, SessionError::WrongState { state: "InProgress", .. }));
    }

    #[test]
    fn test_answer_and_navigate() {
        let session = started()
            .submit_answer(0, OptionLetter::B)
            .unwrap()
            .advance()
            .unwrap();
        assert_eq!(session.current_index(), Some(1));
        assert_eq!(session.current_question().unwrap().question, "Describe the water cycle.");

        // 最后一题再前进保持不变
        let session = session.advance().unwrap();
        assert_eq!(session.current_index(), Some(1));

        let session = session.go_back().unwrap().go_back().unwrap();
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.answers().get(&0), Some(&OptionLetter::B));
    }

    #[test]
    fn test_answer_overwrites() {
        let session = started()
            .submit_answer(1, OptionLetter::C)
            .unwrap()
            .submit_answer(1, OptionLetter::D)
            .unwrap();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers().get(&1), Some(&OptionLetter::D));
    }

    #[test]
    fn test_answer_validation() {
        let err = started().submit_answer(5, OptionLetter::A).unwrap_err();
        assert_eq!(err, SessionError::IndexOutOfRange { index: 5, max_index: 1 });

        let err = started().submit_answer(0, OptionLetter::C).unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption { index: 0, .. }));

        let err = ExamSession::new().submit_answer(0, OptionLetter::A).unwrap_err();
        assert!(matches!(err, SessionError::WrongState { state: "Setup", .. }));
    }

    #[test]
    fn test_jump_to() {
        let session = started().jump_to(1).unwrap();
        assert_eq!(session.current_index(), Some(1));
        assert!(started().jump_to(2).is_err());
    }

    #[test]
    fn test_time_left_and_timeout() {
        let session = started();
        assert_eq!(session.time_left_seconds(at(0, 0)), 1800);
        assert_eq!(session.time_left_seconds(at(10, 30)), 1170);

        let session = session.tick(at(29, 59));
        assert!(session.is_in_progress());

        let session = session.tick(at(31, 0));
        assert!(matches!(session.state(), ExamState::Completed { timed_out: true, .. }));
        assert_eq!(session.time_left_seconds(at(45, 0)), 0);
    }

    #[test]
    fn test_finish_and_summary() {
        let session = started()
            .submit_answer(0, OptionLetter::A)
            .unwrap()
            .finish(at(5, 0))
            .unwrap();
        assert!(session.is_completed());

        let summary = session.summary();
        assert_eq!(summary.answered, 1);
        assert_eq!(summary.total, 2);
        assert!((summary.completion_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.elapsed_seconds, Some(300));

        assert!(session.clone().finish(at(6, 0)).is_err());
        assert!(session.clone().submit_answer(1, OptionLetter::A).is_err());
        assert_eq!(session.reset(), ExamSession::new());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(1170), "19:30");
        assert_eq!(format_time(-5), "00:00");
    }
}
