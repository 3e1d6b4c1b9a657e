//! 警告写入服务 - 业务能力层
//!
//! 只负责"记录没有识别出选项的题目"能力，不关心流程

use crate::models::question::QuestionSet;
use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
///
/// 职责：
/// - 把退化为占位选项的题目追加写入警告文件，便于人工校对
/// - 不修改题目
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用指定的文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 写入单条警告
    ///
    /// # 参数
    /// - `paper_name`: 试卷名称
    /// - `question_number`: 题号（从1开始）
    /// - `stem`: 题干内容
    pub async fn write(&self, paper_name: &str, question_number: usize, stem: &str) -> Result<()> {
        debug!(
            "写入警告: 试卷 {} | 题目 {} | 题干长度: {}",
            paper_name,
            question_number,
            stem.len()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        let warn_msg = format!(
            "试卷 {} | 题目 {} | 未识别出选项 | 题干: {}\n",
            paper_name, question_number, stem
        );
        file.write_all(warn_msg.as_bytes()).await?;

        Ok(())
    }

    /// 写入整份试卷中所有使用占位选项的题目，返回写入条数
    pub async fn write_placeholders(&self, paper_name: &str, questions: &QuestionSet) -> Result<usize> {
        let mut written = 0;
        for (index, record) in questions.iter().enumerate() {
            if record.has_placeholder_options() {
                self.write(paper_name, index + 1, &record.question).await?;
                written += 1;
            }
        }
        Ok(written)
    }
}
