//! 图片加载 - 业务能力层
//!
//! 把文件路径或原始字节转换成可直接嵌入 HTML 的 data URI

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, FileError};
use crate::models::{ImageData, ImageSource};

const DEFAULT_MIME: &str = "image/png";

/// 根据文件头判断图片类型，无法识别时按 PNG 处理
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        DEFAULT_MIME
    }
}

/// 读取图片
pub async fn load_image(source: &ImageSource) -> AppResult<ImageData> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes.clone(),
        ImageSource::Path(path) => {
            if !path.exists() {
                return Err(AppError::File(FileError::NotFound {
                    path: path.display().to_string(),
                }));
            }
            tokio::fs::read(path)
                .await
                .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?
        }
    };

    debug!("读取图片: {} 字节", bytes.len());

    Ok(ImageData {
        mime_type: sniff_mime(&bytes).to_string(),
        bytes,
    })
}

/// 生成 data URI
pub fn to_data_uri(image: &ImageData) -> String {
    format!("data:{};base64,{}", image.mime_type, BASE64.encode(&image.bytes))
}

/// 尽力加载一组图片，读取失败的跳过并记录警告
pub async fn load_data_uris(sources: &[ImageSource]) -> Vec<String> {
    let mut uris = Vec::with_capacity(sources.len());
    for source in sources {
        match load_image(source).await {
            Ok(image) => uris.push(to_data_uri(&image)),
            Err(e) => warn!("⚠️ 图片加载失败，已跳过: {}", e),
        }
    }
    uris
}
