//! PDF 读取器 - 基础设施层
//!
//! 只暴露"按页取文本"的能力，文档句柄只在一次调用内存在

use crate::error::DocumentError;
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 按页提供文本的文档
///
/// 职责：
/// - 返回按页码排序的每页文本
/// - 失败时返回 DocumentError，不 panic
/// - 不认识题目 / 选项
pub trait PageSource {
    /// 文档名称（用于日志）
    fn name(&self) -> &str;

    /// 按顺序提取每一页的文本
    fn extract_pages(&self) -> Result<Vec<String>, DocumentError>;
}

enum PdfOrigin {
    File(PathBuf),
    Memory(Vec<u8>),
}

/// 基于 lopdf 的 PDF 文档
pub struct PdfDocument {
    name: String,
    origin: PdfOrigin,
}

impl PdfDocument {
    /// 引用磁盘上的 PDF，真正打开发生在 `extract_pages` 中
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path.display().to_string(),
            origin: PdfOrigin::File(path.to_path_buf()),
        }
    }

    /// 使用内存中的 PDF 数据（例如上传的文件）
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            origin: PdfOrigin::Memory(bytes),
        }
    }

    fn load(&self) -> Result<Document, DocumentError> {
        let loaded = match &self.origin {
            PdfOrigin::File(path) => Document::load(path),
            PdfOrigin::Memory(bytes) => Document::load_mem(bytes),
        };
        loaded.map_err(|e| DocumentError::LoadFailed {
            path: self.name.clone(),
            message: e.to_string(),
        })
    }

    fn read_pages(&self) -> Result<Vec<String>, DocumentError> {
        let doc = self.load()?;

        if doc.is_encrypted() {
            return Err(DocumentError::Encrypted {
                path: self.name.clone(),
            });
        }

        let pages = doc.get_pages();
        debug!("{} 共 {} 页", self.name, pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for (page_num, _page_id) in pages {
            let text = doc
                .extract_text(&[page_num])
                .map_err(|e| DocumentError::PageTextFailed {
                    page: page_num,
                    message: e.to_string(),
                })?;
            texts.push(text);
        }

        Ok(texts)
    }
}

impl PageSource for PdfDocument {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract_pages(&self) -> Result<Vec<String>, DocumentError> {
        // 损坏的 PDF 可能让解析库 panic，这里统一转成读取失败
        panic::catch_unwind(AssertUnwindSafe(|| self.read_pages())).unwrap_or_else(|_| {
            Err(DocumentError::LoadFailed {
                path: self.name.clone(),
                message: "PDF 解析过程中发生 panic".to_string(),
            })
        })
    }
}

/// 已经提取好的纯文本页（例如 .txt 导出）
pub struct TextPages {
    name: String,
    pages: Vec<String>,
}

impl TextPages {
    pub fn new(name: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }
}

impl PageSource for TextPages {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract_pages(&self) -> Result<Vec<String>, DocumentError> {
        Ok(self.pages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail_to_load() {
        let doc = PdfDocument::from_bytes("broken.pdf", b"this is not a pdf".to_vec());
        let err = doc.extract_pages().unwrap_err();
        assert!(matches!(err, DocumentError::LoadFailed { ref path, .. } if path == "broken.pdf"));
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let doc = PdfDocument::open("/no/such/exam.pdf");
        assert!(matches!(
            doc.extract_pages(),
            Err(DocumentError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_text_pages_keep_order() {
        let source = TextPages::new("paper", vec!["one".to_string(), "two".to_string()]);
        assert_eq!(source.name(), "paper");
        assert_eq!(source.extract_pages().unwrap(), vec!["one", "two"]);
    }
}
