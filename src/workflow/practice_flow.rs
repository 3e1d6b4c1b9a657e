//! 练习流程 - 流程层
//!
//! 核心职责：把一行行用户输入翻译成 ExamSession 的状态转换
//!
//! 命令：
//! - `A`-`D`：作答当前题
//! - `n` / `p`：下一题 / 上一题
//! - `g <题号>`：跳转
//! - `s` / `q`：交卷
//! - `r`：清空答案并重新计时
//! - `h`：帮助

use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::models::question::OptionLetter;
use crate::session::{format_time, ExamSession, ExamState};

/// 用户命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Answer(OptionLetter),
    Next,
    Previous,
    /// 题号从1开始
    Goto(usize),
    Submit,
    Restart,
    Help,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(letter) = OptionLetter::parse(line) {
            return Some(Command::Answer(letter));
        }

        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_lowercase();
        match (command.as_str(), parts.next()) {
            ("n", None) => Some(Command::Next),
            ("p", None) => Some(Command::Previous),
            ("s", None) | ("q", None) => Some(Command::Submit),
            ("r", None) => Some(Command::Restart),
            ("h", None) => Some(Command::Help),
            ("g", Some(number)) => number.parse().ok().map(Command::Goto),
            _ => None,
        }
    }
}

/// 练习流程
///
/// - 不持有会话，会话作为值传入传出
/// - 时间来自注入的时钟，便于测试
pub struct PracticeFlow<C = fn() -> DateTime<Local>> {
    clock: C,
}

impl PracticeFlow {
    pub fn new() -> Self {
        Self { clock: Local::now }
    }
}

impl Default for PracticeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Fn() -> DateTime<Local>> PracticeFlow<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// 运行到交卷、超时或输入结束为止，返回已完成的会话
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut session: ExamSession,
        input: R,
        output: &mut W,
    ) -> Result<ExamSession> {
        let mut lines = input.lines();

        while session.is_in_progress() {
            session = session.tick((self.clock)());
            if session.is_completed() {
                writeln!(output, "⏰ 时间到，自动交卷")?;
                break;
            }

            self.render_question(&session, output)?;

            let Some(line) = lines.next() else {
                info!("输入结束，自动交卷");
                session = session.finish((self.clock)())?;
                break;
            };
            let line = line?;

            let Some(command) = Command::parse(&line) else {
                writeln!(output, "无法识别的命令: {} (输入 h 查看帮助)", line.trim())?;
                continue;
            };

            session = match self.apply(session.clone(), command) {
                Ok(next) => next,
                Err(e) => {
                    warn!("⚠️ {}", e);
                    writeln!(output, "⚠️ {}", e)?;
                    session
                }
            };

            if command == Command::Help {
                write_help(output)?;
            }
        }

        self.render_summary(&session, output)?;
        Ok(session)
    }

    fn apply(&self, session: ExamSession, command: Command) -> Result<ExamSession> {
        let next = match command {
            Command::Answer(letter) => {
                let index = session.current_index().unwrap_or_default();
                session.submit_answer(index, letter)?
            }
            Command::Next => session.advance()?,
            Command::Previous => session.go_back()?,
            Command::Goto(number) => session.jump_to(number.saturating_sub(1))?,
            Command::Submit => session.finish((self.clock)())?,
            Command::Restart => {
                let questions = session.questions().clone();
                let minutes = session.duration_minutes();
                session.reset().start_exam(questions, minutes, (self.clock)())?
            }
            Command::Help => session,
        };
        Ok(next)
    }

    fn render_question<W: Write>(&self, session: &ExamSession, output: &mut W) -> Result<()> {
        let (Some(index), Some(question)) = (session.current_index(), session.current_question())
        else {
            return Ok(());
        };
        let total = session.questions().len();
        let selected = session.answers().get(&index);

        writeln!(output)?;
        writeln!(
            output,
            "已答 {}/{} | ⏱️ 剩余时间: {}",
            session.answers().len(),
            total,
            format_time(session.time_left_seconds((self.clock)()))
        )?;
        writeln!(output, "第 {} 题 / 共 {} 题", index + 1, total)?;
        writeln!(output, "{}", question.question)?;
        for (letter, text) in &question.options {
            let mark = if selected == Some(letter) { "●" } else { "○" };
            writeln!(output, "  {} {}. {}", mark, letter, text)?;
        }
        write!(output, "> ")?;
        output.flush()?;
        Ok(())
    }

    fn render_summary<W: Write>(&self, session: &ExamSession, output: &mut W) -> Result<()> {
        let summary = session.summary();
        writeln!(output)?;
        writeln!(output, "{}", "=".repeat(40))?;
        writeln!(output, "🎉 练习完成")?;
        writeln!(output, "已答题目: {}/{}", summary.answered, summary.total)?;
        writeln!(output, "完成度: {:.1}%", summary.completion_percent)?;
        if let ExamState::Completed { timed_out: true, .. } = session.state() {
            writeln!(output, "用时: {} 分钟 (超时)", summary.duration_minutes)?;
        } else if let Some(elapsed) = summary.elapsed_seconds {
            writeln!(output, "用时: {}", format_time(elapsed))?;
        }
        writeln!(output, "{}", "=".repeat(40))?;
        Ok(())
    }
}

fn write_help<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "A-D 作答 | n 下一题 | p 上一题 | g <题号> 跳转 | s/q 交卷 | r 重新开始 | h 帮助")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionRecord, QuestionSet};
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::collections::BTreeMap;
    use std::io::Cursor;

    fn start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().unwrap()
    }

    fn session() -> ExamSession {
        let mut options = BTreeMap::new();
        options.insert(OptionLetter::A, "3".to_string());
        options.insert(OptionLetter::B, "4".to_string());
        let questions = QuestionSet::from(vec![
            QuestionRecord::new("What is 2+2?", options),
            QuestionRecord::with_placeholder_options("Describe the water cycle."),
            QuestionRecord::with_placeholder_options("Name a prime number."),
        ]);
        ExamSession::new().start_exam(questions, 1, start()).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("b"), Some(Command::Answer(OptionLetter::B)));
        assert_eq!(Command::parse(" N "), Some(Command::Next));
        assert_eq!(Command::parse("g 3"), Some(Command::Goto(3)));
        assert_eq!(Command::parse("g x"), None);
        assert_eq!(Command::parse("s"), Some(Command::Submit));
        assert_eq!(Command::parse("q"), Some(Command::Submit));
        assert_eq!(Command::parse("r"), Some(Command::Restart));
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("e"), None);
    }

    #[test]
    fn test_answer_navigate_submit() {
        let flow = PracticeFlow::with_clock(start);
        let input = Cursor::new("B\nn\nC\ng 3\nx\ns\n");
        let mut output = Vec::new();

        let done = flow.run(session(), input, &mut output).unwrap();
        assert!(done.is_completed());
        assert_eq!(done.answers().get(&0), Some(&OptionLetter::B));
        assert_eq!(done.answers().get(&1), Some(&OptionLetter::C));
        assert_eq!(done.answers().len(), 2);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("第 3 题 / 共 3 题"));
        assert!(text.contains("无法识别的命令: x"));
        assert!(text.contains("已答题目: 2/3"));
    }

    #[test]
    fn test_invalid_option_keeps_session() {
        let flow = PracticeFlow::with_clock(start);
        let input = Cursor::new("D\ns\n");
        let mut output = Vec::new();

        let done = flow.run(session(), input, &mut output).unwrap();
        assert!(done.answers().is_empty());
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("没有选项 D"));
    }

    #[test]
    fn test_restart_clears_answers_and_timer() {
        let calls = Cell::new(0);
        let flow = PracticeFlow::with_clock(|| {
            calls.set(calls.get() + 1);
            start() + chrono::Duration::seconds(calls.get())
        });
        let input = Cursor::new("B\nn\nC\nr\nA\ns\n");
        let mut output = Vec::new();

        let done = flow.run(session(), input, &mut output).unwrap();
        assert_eq!(done.answers().len(), 1);
        assert_eq!(done.answers().get(&0), Some(&OptionLetter::A));
        assert_eq!(done.duration_minutes(), 1);
        let ExamState::Completed { started_at, .. } = done.state() else {
            panic!("session should be completed");
        };
        assert!(*started_at > start());
    }

    #[test]
    fn test_end_of_input_finishes() {
        let flow = PracticeFlow::with_clock(start);
        let done = flow.run(session(), Cursor::new(""), &mut Vec::new()).unwrap();
        assert!(matches!(done.state(), ExamState::Completed { timed_out: false, .. }));
    }

    #[test]
    fn test_timeout_finishes() {
        // 第一次读取时钟在开始时刻，之后跳到两分钟后
        let calls = Cell::new(0);
        let flow = PracticeFlow::with_clock(|| {
            calls.set(calls.get() + 1);
            if calls.get() <= 2 {
                start()
            } else {
                start() + chrono::Duration::seconds(120)
            }
        });
        let input = Cursor::new("A\nn\nn\n");
        let mut output = Vec::new();

        let done = flow.run(session(), input, &mut output).unwrap();
        assert!(matches!(done.state(), ExamState::Completed { timed_out: true, .. }));
        assert_eq!(done.answers().get(&0), Some(&OptionLetter::A));
        assert!(String::from_utf8(output).unwrap().contains("时间到"));
    }
}
