use crate::error::ConfigError;
use crate::extraction::MarkerGrammar;
use tracing::warn;

/// 考试时长允许范围（分钟）
pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 180;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的试卷数量
    pub max_concurrent_papers: usize,
    /// 待提取的 PDF 存放目录
    pub pdf_folder: String,
    /// 提取结果（TOML）存放目录
    pub toml_folder: String,
    /// 练习结果（JSON）存放目录
    pub results_folder: String,
    /// 退化为占位选项的题目记录文件
    pub warn_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 练习配置 ---
    pub exam_duration_minutes: u32,
    // --- 提取配置 ---
    pub option_max_chars: usize,
    pub extra_watermark_patterns: Vec<String>,
    pub marker_grammars: Vec<MarkerGrammar>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_papers: 4,
            pdf_folder: "input_pdf".to_string(),
            toml_folder: "output_toml".to_string(),
            results_folder: "results".to_string(),
            warn_file: "warn.txt".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            exam_duration_minutes: 30,
            option_max_chars: 200,
            extra_watermark_patterns: Vec::new(),
            marker_grammars: MarkerGrammar::FALLBACK_ORDER.to_vec(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_papers: std::env::var("MAX_CONCURRENT_PAPERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_papers),
            pdf_folder: std::env::var("PDF_FOLDER").unwrap_or(default.pdf_folder),
            toml_folder: std::env::var("TOML_FOLDER").unwrap_or(default.toml_folder),
            results_folder: std::env::var("RESULTS_FOLDER").unwrap_or(default.results_folder),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            exam_duration_minutes: std::env::var("EXAM_DURATION_MINUTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.exam_duration_minutes),
            option_max_chars: std::env::var("OPTION_MAX_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.option_max_chars),
            extra_watermark_patterns: std::env::var("EXTRA_WATERMARK_PATTERNS").map(|v| split_patterns(&v)).unwrap_or(default.extra_watermark_patterns),
            marker_grammars: std::env::var("MARKER_GRAMMARS").ok().and_then(|v| parse_grammars(&v)).unwrap_or(default.marker_grammars),
        }
    }

    /// 检查配置取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_papers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_CONCURRENT_PAPERS",
                value: self.max_concurrent_papers.to_string(),
                reason: "必须大于 0",
            });
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.exam_duration_minutes) {
            return Err(ConfigError::InvalidValue {
                name: "EXAM_DURATION_MINUTES",
                value: self.exam_duration_minutes.to_string(),
                reason: "必须在 1 到 180 之间",
            });
        }
        if self.option_max_chars == 0 {
            return Err(ConfigError::InvalidValue {
                name: "OPTION_MAX_CHARS",
                value: self.option_max_chars.to_string(),
                reason: "必须大于 0",
            });
        }
        if self.marker_grammars.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "MARKER_GRAMMARS",
                value: String::new(),
                reason: "至少需要一种题号语法",
            });
        }
        Ok(())
    }
}

/// 多个正则之间用 `;;` 分隔
fn split_patterns(value: &str) -> Vec<String> {
    value
        .split(";;")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// 解析逗号分隔的语法名称，出现未知名称时忽略整个变量
fn parse_grammars(value: &str) -> Option<Vec<MarkerGrammar>> {
    let mut grammars = Vec::new();
    for name in value.split(',').filter(|n| !n.trim().is_empty()) {
        match MarkerGrammar::from_name(name) {
            Ok(grammar) if !grammars.contains(&grammar) => grammars.push(grammar),
            Ok(_) => {}
            Err(e) => {
                warn!("⚠️ MARKER_GRAMMARS 无效，使用默认值: {}", e);
                return None;
            }
        }
    }
    Some(grammars)
}
