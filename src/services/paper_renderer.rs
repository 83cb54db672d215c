//! 试卷渲染 - 业务能力层
//!
//! 把 AI 题目、手动题目和手动图片合成一份完整的、可直接打印的 HTML 文档。
//! 所有试卷格式共用同一个模板，只通过 `PaperFormat` 切换栏数。

use maud::{html, PreEscaped, DOCTYPE};

use crate::models::{GenerationConfig, PaperFormat, PaperHeader, ParsedContent};

const FONT_URL: &str =
    "https://fonts.googleapis.com/css2?family=Noto+Sans+Devanagari&family=Roboto&display=swap";

const INSTRUCTIONS: &str = "Instructions: All questions are compulsory. / सभी प्रश्न अनिवार्य हैं।";

const FOOTER: &str = "Created by PaperBanao.ai • Best of Luck!";

/// 页面几何（A4，固定页边距）在屏幕和打印两种视图下保持一致
const STYLESHEET: &str = r#"
@page { size: A4; margin: 12mm; }
* { box-sizing: border-box; }
body { font-family: 'Roboto', 'Noto Sans Devanagari', sans-serif; line-height: 1.5; margin: 0; color: #000; }
.sheet { width: 210mm; min-height: 297mm; padding: 12mm; margin: 0 auto; background: #fff; }
.main-container { border: 2px solid #000; position: relative; padding-bottom: 30px; }
.header-container { display: flex; align-items: center; border-bottom: 2px double #000; padding-bottom: 15px; margin-bottom: 20px; }
.logo { max-width: 100px; max-height: 100px; margin-right: 20px; }
.header-text { flex-grow: 1; text-align: center; }
.header-text h1 { margin: 0; font-size: 32px; text-transform: uppercase; color: #d32f2f; }
.info-table { width: 100%; margin-top: 10px; border-collapse: collapse; }
.info-table td { padding: 5px; font-weight: bold; border: 1px solid #ddd; }
.info-table td.topic-row { text-align: center; background-color: #eee; }
.instructions { font-size: 12px; font-style: italic; margin: 15px 0; padding: 8px; background: #f9f9f9; border-left: 4px solid #444; }
.content { font-size: 15px; }
.layout-two-column { column-count: 2; column-gap: 28px; column-rule: 1px solid #999; }
.layout-single { column-count: 1; }
.question-item { break-inside: avoid; page-break-inside: avoid; margin-bottom: 12px; }
.figure { max-width: 100%; border: 1px solid #ccc; padding: 5px; border-radius: 5px; }
.page-break { break-before: page; page-break-before: always; }
.answer-key .answer-header { text-align: center; border-bottom: 2px solid #000; margin-bottom: 15px; }
.answer-grid { column-count: 4; column-gap: 20px; font-size: 14px; }
.footer { position: absolute; bottom: 8px; width: 100%; text-align: center; font-size: 10px; color: #555; }
@media screen {
  body { background: #e0e0e0; }
  .sheet { margin: 10mm auto; box-shadow: 0 0 8px rgba(0, 0, 0, 0.3); }
}
@media print {
  body { background: #fff; }
  .sheet { width: auto; min-height: auto; margin: 0; padding: 0; box-shadow: none; }
}
"#;

/// 信息表中的考试元数据
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaperMeta {
    pub exam_name: String,
    pub subject: String,
    pub topic: String,
    pub time: String,
    pub marks: String,
}

/// 文档外框：标题、logo、信息表
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentChrome {
    pub institute_name: String,
    /// logo 的 data URI
    pub logo_data_uri: Option<String>,
    pub meta: PaperMeta,
}

impl DocumentChrome {
    pub fn new(header: &PaperHeader, config: &GenerationConfig, logo_data_uri: Option<String>) -> Self {
        Self {
            institute_name: header.institute_name.clone(),
            logo_data_uri,
            meta: PaperMeta {
                exam_name: config.exam_name.clone(),
                subject: config.subject.clone(),
                topic: config.topic.clone(),
                time: header.time.clone(),
                marks: header.marks.clone(),
            },
        }
    }

    fn title(&self) -> &str {
        [
            &self.meta.topic,
            &self.meta.subject,
            &self.meta.exam_name,
            &self.institute_name,
        ]
        .into_iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("Question Paper")
    }
}

fn layout_class(format: PaperFormat) -> &'static str {
    if format.is_two_column() {
        "layout-two-column"
    } else {
        "layout-single"
    }
}

/// 合并正文：AI 题目 → 手动题目 → 手动图片
fn merge_body(questions_html: &str, manual_html: &str, manual_images_html: &str) -> String {
    let mut body = questions_html.to_string();
    for part in [manual_html, manual_images_html] {
        if !part.trim().is_empty() {
            if !body.is_empty() {
                body.push_str("<br><br>");
            }
            body.push_str(part);
        }
    }
    body
}

/// 渲染完整文档
///
/// 答案不为空时追加答案页，强制从新的一页开始
pub fn render(
    parsed: &ParsedContent,
    manual_html: &str,
    manual_images_html: &str,
    chrome: &DocumentChrome,
    format: PaperFormat,
) -> String {
    let body = merge_body(&parsed.questions_html, manual_html, manual_images_html);
    let info = &chrome.meta;
    let content_class = format!("content {}", layout_class(format));

    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { (chrome.title()) }
                link href=(FONT_URL) rel="stylesheet";
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                div.sheet.main-container {
                    div.header-container {
                        @if let Some(logo) = &chrome.logo_data_uri {
                            img.logo src=(logo) alt="logo";
                        }
                        div.header-text {
                            h1 { (chrome.institute_name) }
                        }
                    }
                    table.info-table {
                        tr {
                            td { "Exam: " (info.exam_name) }
                            td { "Subject: " (info.subject) }
                        }
                        tr {
                            td { "Time: " (info.time) }
                            td { "Marks: " (info.marks) }
                        }
                        tr {
                            td.topic-row colspan="2" { "Topic: " (info.topic) }
                        }
                    }
                    div.instructions { (INSTRUCTIONS) }
                    div class=(content_class) { (PreEscaped(&body)) }
                    div.footer { (FOOTER) }
                }
                @if parsed.has_answers() {
                    div.page-break {}
                    section.sheet.answer-key {
                        div.answer-header {
                            h2 { "Answer Key" }
                            p { (info.subject) " - " (info.topic) }
                        }
                        div.answer-grid { (PreEscaped(&parsed.answers_html)) }
                    }
                }
            }
        }
    };

    markup.into_string()
}
