use crate::error::FileError;
use crate::models::question::ExamPaper;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 ExamPaper 对象
pub async fn load_toml_to_exam_paper(toml_file_path: &Path) -> Result<ExamPaper> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: toml_file_path.display().to_string(),
            source,
        })?;

    let paper: ExamPaper = toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
        path: toml_file_path.display().to_string(),
        source,
    })?;

    Ok(paper.with_file_path(toml_file_path.to_string_lossy().to_string()))
}

/// 将提取出的试卷写入 `folder/<name>.toml`，返回写入的路径
pub async fn save_exam_paper(folder_path: &str, paper: &ExamPaper) -> Result<PathBuf> {
    let folder = PathBuf::from(folder_path);
    fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("无法创建文件夹: {}", folder_path))?;

    let content = toml::to_string(paper).map_err(FileError::from)?;
    let path = folder.join(format!("{}.toml", paper.name));

    fs::write(&path, content)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        })?;

    Ok(path)
}

/// 从文件夹中加载所有 TOML 文件并转换为 ExamPaper 对象列表
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<ExamPaper>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut papers = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_exam_paper(&path).await {
                Ok(paper) => {
                    tracing::info!("成功加载 {} 个题目", paper.questions.len());
                    papers.push(paper);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(papers)
}
