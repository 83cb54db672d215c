//! 解析结果与手动内容

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 区分题目和答案的分隔符
pub const BREAK_TOKEN: &str = "[[BREAK]]";

/// 题目块的 class，渲染时据此避免分页截断
pub const QUESTION_ITEM_CLASS: &str = "question-item";

/// `class='...'` 或 `class="..."` 属性
static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:'([^']*)'|"([^"]*)")"#).expect("invalid class regex")
});

/// 解析后的 AI 内容
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedContent {
    /// 题目部分（HTML 片段）
    pub questions_html: String,
    /// 答案部分，没有分隔符时为空
    pub answers_html: String,
}

impl ParsedContent {
    pub fn has_answers(&self) -> bool {
        !self.answers_html.trim().is_empty()
    }

    /// 题目部分中 class 列表包含 `question-item` 的元素数量
    pub fn question_block_count(&self) -> usize {
        CLASS_ATTR
            .captures_iter(&self.questions_html)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter(|classes| {
                classes
                    .as_str()
                    .split_whitespace()
                    .any(|class| class == QUESTION_ITEM_CLASS)
            })
            .count()
    }
}

/// 手动题目的选项排列方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionLayout {
    /// 每个选项单独一行
    #[default]
    Stacked,
    /// 所有选项同一行，用宽间隔分开
    Inline,
}

/// 图片来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// 可嵌入的图片数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 用户手动录入的内容
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualContent {
    /// 手动题目原文，题目之间用空行分隔
    pub text: String,
    /// 图片路径列表
    pub images: Vec<PathBuf>,
    pub option_layout: OptionLayout,
}

impl ManualContent {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }
}
