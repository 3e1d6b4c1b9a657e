//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描 `pdf_folder` 中的 PDF
//! - 控制并发数量（Semaphore）
//! - 练习模式：加载试卷、运行 PracticeFlow、保存结果
//! - 输出全局统计信息
//!
//! ### `paper_processor` - 单个试卷处理器
//! - 在阻塞线程上运行提取流水线
//! - 记录占位选项警告
//! - 导出 TOML
//! - 输出单个试卷的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! paper_processor (处理单个文档)
//!     ↓
//! extraction (Normalizer → Segmenter → Options)
//!     ↓
//! infrastructure (PageSource：PDF / 文本)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，paper_processor 管单个
//! 2. **失败隔离**：单份试卷失败只计数，不中断整批
//! 3. **向下依赖**：编排层 → workflow / extraction → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体解析判断

pub mod batch_processor;
pub mod paper_processor;

// 重新导出主要类型
pub use batch_processor::{App, RunMode};
pub use paper_processor::{load_questions, process_paper, QuestionStats};
