use crate::models::question::OptionLetter;
use crate::session::exam_session::{ExamSession, ExamState, ExamSummary};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 已完成练习的结果，写入 JSON
#[derive(Debug, Clone, Serialize)]
pub struct ExamReport {
    pub paper_name: String,
    pub finished_at: String,
    pub timed_out: bool,
    pub summary: ExamSummary,
    /// 题号（从1开始） → 所选字母
    pub answers: BTreeMap<usize, OptionLetter>,
}

impl ExamReport {
    /// 会话未完成时返回 None
    pub fn from_session(paper_name: impl Into<String>, session: &ExamSession) -> Option<Self> {
        let ExamState::Completed {
            finished_at,
            timed_out,
            ..
        } = session.state()
        else {
            return None;
        };

        Some(Self {
            paper_name: paper_name.into(),
            finished_at: finished_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            timed_out: *timed_out,
            summary: session.summary(),
            answers: session
                .answers()
                .iter()
                .map(|(index, letter)| (index + 1, *letter))
                .collect(),
        })
    }

    /// 写入 `folder/<paper_name>-<时间>.json`
    pub async fn save(&self, folder_path: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(folder_path)
            .await
            .with_context(|| format!("无法创建文件夹: {}", folder_path))?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = PathBuf::from(folder_path).join(format!("{}-{}.json", self.paper_name, stamp));
        let content = serde_json::to_string_pretty(self)?;

        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{QuestionRecord, QuestionSet};

    fn completed_session() -> ExamSession {
        let questions = QuestionSet::from(vec![
            QuestionRecord::with_placeholder_options("First?"),
            QuestionRecord::with_placeholder_options("Second?"),
        ]);
        let now = chrono::Local::now();
        ExamSession::new()
            .start_exam(questions, 10, now)
            .and_then(|s| s.submit_answer(1, OptionLetter::C))
            .and_then(|s| s.finish(now))
            .unwrap()
    }

    #[test]
    fn test_report_requires_completed_session() {
        assert!(ExamReport::from_session("paper", &ExamSession::new()).is_none());
    }

    #[test]
    fn test_report_uses_one_based_numbers() {
        let report = ExamReport::from_session("paper", &completed_session()).unwrap();
        assert_eq!(report.answers.get(&2), Some(&OptionLetter::C));
        assert_eq!(report.summary.answered, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["answers"]["2"], "C");
        assert_eq!(json["timed_out"], false);
    }

    #[tokio::test]
    async fn test_save_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = ExamReport::from_session("paper", &completed_session()).unwrap();
        let path = tokio_test::assert_ok!(report.save(&dir.path().to_string_lossy()).await);
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("\"paper_name\": \"paper\""));
    }
}
