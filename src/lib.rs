//! # Exam Practice
//!
//! 从试卷 PDF 中提取选择题，并在终端中进行限时练习
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 读取文档，只暴露按页取文本的能力
//! - `PageSource` - 页面文本来源（PDF / 内存文本）
//!
//! ### ② 提取层（Extraction）
//! - `extraction/` - 纯文本处理，不做 IO
//! - `Normalizer` - 去除水印、页码、日期并压缩空白
//! - `segment` - 按题号标记切分题目
//! - `extract_record` - 识别 A-D 选项，得到题干与选项
//! - `QuestionExtractor` - 串联以上步骤，失败时返回空集合
//!
//! ### ③ 会话与流程层（Session / Workflow）
//! - `session/` - 不可变的 ExamSession 状态机（准备 → 进行中 → 已完成）
//! - `workflow/` - PracticeFlow 把终端命令翻译为状态转换
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量提取与练习模式入口
//! - `orchestrator/paper_processor` - 单个试卷的提取与导出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extraction;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use extraction::{Extraction, MarkerGrammar, Normalizer, QuestionExtractor};
pub use infrastructure::{PageSource, PdfDocument, TextPages};
pub use models::{ExamPaper, OptionLetter, QuestionRecord, QuestionSet};
pub use orchestrator::{process_paper, App, RunMode};
pub use session::{ExamReport, ExamSession, ExamState};
pub use workflow::PracticeFlow;
