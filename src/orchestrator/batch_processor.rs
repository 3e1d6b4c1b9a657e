//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量提取和练习模式的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、写日志文件头、构建提取器
//! 2. **批量扫描**：找出 `pdf_folder` 下所有待提取的 PDF
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将试卷分批次处理，每批完成后再开始下一批
//! 5. **练习模式**：加载单份试卷并在终端中进行限时练习
//! 6. **全局统计**：汇总所有试卷的处理结果

use crate::config::Config;
use crate::error::ConfigError;
use crate::extraction::QuestionExtractor;
use crate::orchestrator::paper_processor;
use crate::session::{ExamReport, ExamSession};
use crate::utils::logging::init_log_file;
use crate::workflow::PracticeFlow;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 运行模式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// 批量提取 `pdf_folder` 中的所有 PDF
    Batch,
    /// 对单份试卷进行限时练习
    Practice {
        path: PathBuf,
        duration_minutes: Option<u32>,
    },
}

impl RunMode {
    /// 从命令行参数解析：无参数为批量模式，`<文件> [分钟]` 为练习模式
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ConfigError> {
        let mut args = args.into_iter();
        let Some(path) = args.next() else {
            return Ok(RunMode::Batch);
        };

        let duration_minutes = match args.next() {
            Some(value) => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "duration_minutes",
                value,
                reason: "必须是整数分钟数",
            })?),
            None => None,
        };

        Ok(RunMode::Practice {
            path: PathBuf::from(path),
            duration_minutes,
        })
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    extractor: Arc<QuestionExtractor>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        let extractor = QuestionExtractor::from_config(&config)?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        Ok(Self {
            config,
            extractor: Arc::new(extractor),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, mode: RunMode) -> Result<()> {
        match mode {
            RunMode::Batch => self.run_batch().await,
            RunMode::Practice {
                path,
                duration_minutes,
            } => self.run_practice(path, duration_minutes).await,
        }
    }

    /// 批量提取所有 PDF
    async fn run_batch(&self) -> Result<()> {
        let all_pdfs = self.scan_pdfs().await?;

        if all_pdfs.is_empty() {
            warn!("⚠️ 没有找到待处理的PDF文件，程序结束");
            return Ok(());
        }

        let total_papers = all_pdfs.len();
        log_papers_loaded(total_papers, self.config.max_concurrent_papers);

        // 处理所有试卷
        let stats = self.process_all_papers(all_pdfs).await?;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(())
    }

    /// 单份试卷的限时练习
    async fn run_practice(&self, path: PathBuf, duration_minutes: Option<u32>) -> Result<()> {
        info!("\n📄 正在提取题目: {}", path.display());
        let (name, questions) = paper_processor::load_questions(self.extractor.clone(), &path).await?;
        info!("✅ 找到 {} 道题目", questions.len());

        let minutes = duration_minutes.unwrap_or(self.config.exam_duration_minutes);
        let session = ExamSession::new().start_exam(questions, minutes, chrono::Local::now())?;
        info!("⏱️ 考试开始，时长 {} 分钟", minutes);

        // 终端输入是阻塞的，放到阻塞线程中运行
        let session = tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            PracticeFlow::new().run(session, stdin.lock(), &mut stdout)
        })
        .await
        .context("练习任务执行失败")??;

        if let Some(report) = ExamReport::from_session(name, &session) {
            let saved = report.save(&self.config.results_folder).await?;
            info!("📝 练习结果已保存至: {}", saved.display());
        }

        Ok(())
    }

    /// 扫描待处理的 PDF
    async fn scan_pdfs(&self) -> Result<Vec<PathBuf>> {
        info!("\n📁 正在扫描待处理的PDF...");
        let folder = PathBuf::from(&self.config.pdf_folder);
        if !folder.exists() {
            anyhow::bail!("文件夹不存在: {}", self.config.pdf_folder);
        }

        let mut pdfs = Vec::new();
        let mut entries = tokio::fs::read_dir(&folder)
            .await
            .with_context(|| format!("无法读取文件夹: {}", self.config.pdf_folder))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if is_pdf {
                pdfs.push(path);
            }
        }
        pdfs.sort();
        Ok(pdfs)
    }

    /// 处理所有试卷
    async fn process_all_papers(&self, all_pdfs: Vec<PathBuf>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_papers));
        let total_papers = all_pdfs.len();
        let mut stats = ProcessingStats {
            total: total_papers,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_papers).step_by(self.config.max_concurrent_papers) {
            let batch_end = (batch_start + self.config.max_concurrent_papers).min(total_papers);
            let batch_pdfs = &all_pdfs[batch_start..batch_end];
            let batch_num = (batch_start / self.config.max_concurrent_papers) + 1;
            let total_batches = total_papers.div_ceil(self.config.max_concurrent_papers);

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_papers,
            );

            // 处理本批
            let batch_result = self
                .process_batch(batch_pdfs, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_pdfs: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, pdf_path) in batch_pdfs.iter().enumerate() {
            let paper_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let extractor = self.extractor.clone();
            let pdf_path = pdf_path.clone();
            let config_clone = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match paper_processor::process_paper(extractor, pdf_path, paper_index, &config_clone)
                    .await
                {
                    Ok(done) => Ok(done),
                    Err(e) => {
                        error!("[试卷 {}] ❌ 处理过程中发生错误: {}", paper_index, e);
                        Err(e)
                    }
                }
            });
            batch_handles.push((paper_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();

        for (paper_index, handle) in batch_handles {
            match handle.await {
                Ok(Ok(true)) => {
                    result.success += 1;
                }
                Ok(Ok(false)) | Ok(Err(_)) => {
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[试卷 {}] 任务执行失败: {}", paper_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷题目提取");
    info!("📊 最大并发数: {}", config.max_concurrent_papers);
    info!("{}", "=".repeat(60));
}

fn log_papers_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的PDF", total);
    info!("📋 将以每批 {} 个的方式处理", max_concurrent);
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批试卷: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 成功 {}/{}",
        batch_num,
        result.success,
        result.success + result.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("📁 导出目录: {}", config.toml_folder);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_from_args() {
        assert_eq!(RunMode::from_args(Vec::<String>::new()).unwrap(), RunMode::Batch);
        assert_eq!(
            RunMode::from_args(vec!["paper.pdf".to_string(), "45".to_string()]).unwrap(),
            RunMode::Practice {
                path: PathBuf::from("paper.pdf"),
                duration_minutes: Some(45),
            }
        );
        assert!(RunMode::from_args(vec!["paper.pdf".to_string(), "soon".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_batch_counts_failures_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_folder = dir.path().join("pdf");
        std::fs::create_dir_all(&pdf_folder).unwrap();
        std::fs::write(pdf_folder.join("a.pdf"), b"garbage").unwrap();
        std::fs::write(pdf_folder.join("b.PDF"), b"garbage").unwrap();
        std::fs::write(pdf_folder.join("c.txt"), b"ignored").unwrap();

        let config = Config {
            max_concurrent_papers: 1,
            pdf_folder: pdf_folder.to_string_lossy().to_string(),
            toml_folder: dir.path().join("toml").to_string_lossy().to_string(),
            warn_file: dir.path().join("warn.txt").to_string_lossy().to_string(),
            output_log_file: dir.path().join("output.txt").to_string_lossy().to_string(),
            ..Config::default()
        };
        let app = App::initialize(config).await.unwrap();

        let pdfs = app.scan_pdfs().await.unwrap();
        assert_eq!(pdfs.len(), 2);

        let stats = app.process_all_papers(pdfs).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.success, 0);
    }

    #[tokio::test]
    async fn test_initialize_rejects_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            extra_watermark_patterns: vec!["([".to_string()],
            output_log_file: dir.path().join("output.txt").to_string_lossy().to_string(),
            ..Config::default()
        };
        assert!(App::initialize(config).await.is_err());
    }
}
