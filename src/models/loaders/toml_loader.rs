use crate::error::{AppError, FileError};
use crate::models::paper_request::PaperRequest;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载试卷请求
///
/// logo 和图片的相对路径按请求文件所在目录解析
pub async fn load_paper_request(toml_file_path: &Path) -> Result<PaperRequest> {
    let path_text = toml_file_path.display().to_string();
    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(path_text.clone(), e))?;

    let mut request: PaperRequest =
        toml::from_str(&content).map_err(|source| FileError::TomlParseFailed {
            path: path_text,
            source,
        })?;

    let base_dir = toml_file_path.parent().unwrap_or_else(|| Path::new("."));
    request.header.logo = request
        .header
        .logo
        .take()
        .map(|logo| resolve_relative(base_dir, logo));
    request.manual.images = request
        .manual
        .images
        .drain(..)
        .map(|img| resolve_relative(base_dir, img))
        .collect();

    request.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(request)
}

/// 从文件夹中加载所有 TOML 试卷请求，按文件名排序
pub async fn load_all_paper_requests(folder_path: &str) -> Result<Vec<PaperRequest>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut requests = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_paper_request(&path).await {
            Ok(request) => {
                tracing::info!(
                    "成功加载: AI 题目 {} 道, 手动图片 {} 张",
                    request.generation.total_questions(),
                    request.manual.images.len()
                );
                requests.push(request);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(requests)
}

fn resolve_relative(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
