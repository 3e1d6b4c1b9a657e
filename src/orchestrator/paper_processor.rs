//! 单个试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责把单个文档变成可练习的题目集合，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **提取题目**：在阻塞线程上运行提取流水线（文档句柄只在该调用内存在）
//! 2. **结果判定**：读取失败或没有题目都算失败，但不影响其他试卷
//! 3. **警告记录**：退化为占位选项的题目写入警告文件
//! 4. **结果导出**：保存为 TOML，之后练习无需再次解析 PDF
//! 5. **统计输出**：记录结构化/占位题目数量

use crate::config::Config;
use crate::extraction::{Extraction, QuestionExtractor};
use crate::infrastructure::{PageSource, PdfDocument, TextPages};
use crate::models::{load_toml_to_exam_paper, save_exam_paper, ExamPaper, QuestionSet};
use crate::services::WarnWriter;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 题目处理统计
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QuestionStats {
    /// 识别出选项的题目
    pub structured: usize,
    /// 使用占位选项的题目
    pub placeholder: usize,
}

impl QuestionStats {
    pub fn from_questions(questions: &QuestionSet) -> Self {
        let placeholder = questions.placeholder_count();
        Self {
            structured: questions.len() - placeholder,
            placeholder,
        }
    }
}

/// 处理单个 PDF：提取 → 写警告 → 导出 TOML
///
/// # 参数
/// - `extractor`: 题目提取器
/// - `pdf_path`: PDF 路径
/// - `paper_index`: 试卷索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回是否成功处理
pub async fn process_paper(
    extractor: Arc<QuestionExtractor>,
    pdf_path: PathBuf,
    paper_index: usize,
    config: &Config,
) -> Result<bool> {
    let name = paper_name(&pdf_path);
    log_paper_start(paper_index, &name, &pdf_path);

    let source = PdfDocument::open(&pdf_path);
    let extraction = extract_blocking(extractor, source).await?;

    if let Some(failure) = &extraction.failure {
        error!("[试卷 {}] ❌ 文档读取失败: {}", paper_index, failure);
        return Ok(false);
    }
    if extraction.is_empty() {
        warn!("[试卷 {}] ⚠️ 未找到题目，跳过此试卷", paper_index);
        return Ok(false);
    }

    let questions = extraction.questions;
    let stats = QuestionStats::from_questions(&questions);

    if stats.placeholder > 0 {
        let warn_writer = WarnWriter::with_path(&config.warn_file);
        let written = warn_writer.write_placeholders(&name, &questions).await?;
        warn!(
            "[试卷 {}] ⚠️ {} 道题目未识别出选项，已写入 {}",
            paper_index, written, config.warn_file
        );
    }

    let paper = ExamPaper::new(name, pdf_path.display().to_string(), questions);
    let saved = save_exam_paper(&config.toml_folder, &paper).await?;
    info!("[试卷 {}] ✓ 已导出: {}", paper_index, saved.display());

    log_paper_complete(paper_index, &stats, paper.questions.len());

    Ok(true)
}

/// 为练习加载题目：`.toml` 直接读取导出结果，`.txt` 视为已提取的文本，其余按 PDF 处理
///
/// # 返回
/// 返回 (试卷名称, 题目集合)，没有题目时返回错误
pub async fn load_questions(
    extractor: Arc<QuestionExtractor>,
    path: &Path,
) -> Result<(String, QuestionSet)> {
    let name = paper_name(path);
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase);

    let questions = match extension.as_deref() {
        Some("toml") => load_toml_to_exam_paper(path).await?.questions,
        Some("txt") => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("无法读取文本文件: {}", path.display()))?;
            let extraction = extract_blocking(extractor, TextPages::new(name.clone(), vec![text])).await?;
            extraction.questions
        }
        _ => {
            let extraction = extract_blocking(extractor, PdfDocument::open(path)).await?;
            if let Some(failure) = extraction.failure {
                bail!("提取题目失败: {}", failure);
            }
            extraction.questions
        }
    };

    if questions.is_empty() {
        bail!("❌ 没有找到题目: {}", path.display());
    }

    Ok((name, questions))
}

async fn extract_blocking<S>(extractor: Arc<QuestionExtractor>, source: S) -> Result<Extraction>
where
    S: PageSource + Send + 'static,
{
    let extraction = tokio::task::spawn_blocking(move || extractor.extract_questions(&source))
        .await
        .context("提取任务执行失败")?;
    Ok(extraction)
}

fn paper_name(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

// ========== 日志辅助函数 ==========

fn log_paper_start(paper_index: usize, name: &str, path: &Path) {
    info!("[试卷 {}] 开始处理", paper_index);
    info!("[试卷 {}] 名称: {}", paper_index, name);
    info!("[试卷 {}] 路径: {}", paper_index, path.display());
}

fn log_paper_complete(paper_index: usize, stats: &QuestionStats, total: usize) {
    info!(
        "[试卷 {}] 题目统计: 结构化 {}, 占位选项 {}, 总计 {}",
        paper_index, stats.structured, stats.placeholder, total
    );
    info!("\n[试卷 {}] ✅ 试卷处理完成\n", paper_index);
}
