use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档读取错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 练习会话错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文档读取错误
///
/// 只在基础设施层产生，流水线边界会把它转换为"提取失败"信号
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文档无法解析（损坏或不支持）
    #[error("无法加载文档 ({path}): {message}")]
    LoadFailed { path: String, message: String },
    /// 文档已加密
    #[error("文档已加密: {path}")]
    Encrypted { path: String },
    /// 单页文本提取失败
    #[error("第 {page} 页文本提取失败: {message}")]
    PageTextFailed { page: u32, message: String },
}

/// 练习会话错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// 题目列表为空，不能开始考试
    #[error("没有找到题目，无法开始考试")]
    NoQuestions,
    /// 考试时长超出范围
    #[error("考试时长 {minutes} 分钟超出范围 [{min}, {max}]")]
    InvalidDuration { minutes: u32, min: u32, max: u32 },
    /// 当前状态不允许该操作
    #[error("当前状态 {state} 不允许操作: {action}")]
    WrongState {
        state: &'static str,
        action: &'static str,
    },
    /// 题目索引超出范围
    #[error("题目索引 {index} 超出范围 [0, {max_index}]")]
    IndexOutOfRange { index: usize, max_index: usize },
    /// 题目不包含该选项
    #[error("第 {index} 题没有选项 {letter}")]
    UnknownOption { index: usize, letter: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// TOML 序列化失败
    #[error("TOML序列化失败: {0}")]
    TomlSerializeFailed(#[from] toml::ser::Error),
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 水印正则无法编译
    #[error("水印正则 '{pattern}' 无效: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// 配置值超出允许范围
    #[error("配置项 {name} 的值 '{value}' 无效: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    /// 未知的题号语法名称
    #[error("未知的题号语法: {0}")]
    UnknownGrammar(String),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_converts_into_app_error() {
        let err: AppError = SessionError::NoQuestions.into();
        assert!(matches!(err, AppError::Session(SessionError::NoQuestions)));
        assert!(err.to_string().contains("没有找到题目"));
    }

    #[test]
    fn test_document_error_message_keeps_details() {
        let err = DocumentError::LoadFailed {
            path: "paper.pdf".to_string(),
            message: "invalid file header".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("paper.pdf"));
        assert!(msg.contains("invalid file header"));
    }
}
