use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::content::ManualContent;
use crate::models::paper_config::GenerationConfig;

/// 试卷页眉信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperHeader {
    /// 机构名称（试卷标题）
    pub institute_name: String,
    /// 机构 logo 路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// 考试时间（显示用）
    pub time: String,
    /// 满分（显示用）
    pub marks: String,
}

impl Default for PaperHeader {
    fn default() -> Self {
        Self {
            institute_name: "Patna Success Classes".to_string(),
            logo: None,
            time: "45 Mins".to_string(),
            marks: "20".to_string(),
        }
    }
}

/// 一份试卷请求（对应一个 TOML 文件）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperRequest {
    pub header: PaperHeader,
    pub generation: GenerationConfig,
    pub manual: ManualContent,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl PaperRequest {
    /// 下载文件名：`<科目>_<考试>_<格式>.html`
    pub fn output_file_name(&self) -> String {
        let subject = non_empty_or(&self.generation.subject, "General");
        let exam = non_empty_or(&self.generation.exam_name, "Paper");
        format!(
            "{}_{}_{}.html",
            sanitize_file_part(subject),
            sanitize_file_part(exam),
            self.generation.format.slug()
        )
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value.trim()
    }
}

fn sanitize_file_part(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::paper_config::PaperFormat;

    #[test]
    fn test_output_file_name() {
        let mut request = PaperRequest::default();
        request.generation.subject = "Science".to_string();
        request.generation.exam_name = "Class 10 Board".to_string();
        request.generation.format = PaperFormat::CbsePattern;
        assert_eq!(request.output_file_name(), "Science_Class_10_Board_CBSE.html");
    }

    #[test]
    fn test_output_file_name_fallbacks() {
        let request = PaperRequest::default();
        assert_eq!(request.output_file_name(), "General_Paper_Standard.html");
    }
}
