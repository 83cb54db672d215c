//! 手动内容格式化 - 业务能力层
//!
//! 把用户手动输入的题目（空行分隔）和图片排成与 AI 题目一致的题目块，
//! 题号接在 AI 题目之后继续编号

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{OptionLayout, QUESTION_ITEM_CLASS};

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("invalid blank line regex"));

/// 题干原有的编号：`Q3.` `Q3)` `3.` `3)` `Q.`，不区分大小写；编号后必须是空白或行尾
static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:q\s*\d+\s*[.)]|\d+\s*[.)]|q\s*\.)(?:\s+|$)")
        .expect("invalid prefix regex")
});

/// 同一行排列选项时的间隔
const INLINE_SEPARATOR: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

/// 图片块的固定标题
const FIGURE_CAPTION: &str = "Question Figure:";

/// 手动题目格式化结果
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualBlock {
    pub html: String,
    /// 生成的题目数量
    pub count: usize,
}

/// 去掉题干原有的编号
pub fn strip_number_prefix(stem: &str) -> &str {
    match NUMBER_PREFIX.find(stem) {
        Some(m) => &stem[m.end()..],
        None => stem,
    }
}

/// 格式化手动题目
///
/// 每组的第一行作为题干，其余行作为选项；题号从 `start_number` 开始
pub fn format_manual(text: &str, start_number: usize, layout: OptionLayout) -> ManualBlock {
    let normalized = text.replace("\r\n", "\n");

    let blocks: Vec<String> = BLANK_LINES
        .split(&normalized)
        .filter_map(|group| {
            let lines: Vec<&str> = group
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            let (stem, options) = lines.split_first()?;
            Some((*stem, options.to_vec()))
        })
        .enumerate()
        .map(|(offset, (stem, options))| {
            render_question(start_number + offset, strip_number_prefix(stem), &options, layout)
        })
        .collect();

    ManualBlock {
        count: blocks.len(),
        html: blocks.join("<br><br>"),
    }
}

fn render_question(number: usize, stem: &str, options: &[&str], layout: OptionLayout) -> String {
    let mut html = format!(
        "<div class='{}'><b>Q{}. {}</b>",
        QUESTION_ITEM_CLASS, number, stem
    );

    if !options.is_empty() {
        let joined = match layout {
            OptionLayout::Stacked => options.join("<br>"),
            OptionLayout::Inline => options.join(INLINE_SEPARATOR),
        };
        html.push_str("<br>");
        html.push_str(&joined);
    }

    html.push_str("</div>");
    html
}

/// 格式化手动图片
///
/// 每张图片单独成块，带固定标题，不与具体题号关联
pub fn format_manual_images(data_uris: &[String]) -> String {
    data_uris
        .iter()
        .map(|uri| {
            format!(
                "<div class='{} figure-block'><p><b>{}</b></p><img src='{}' class='figure'></div>",
                QUESTION_ITEM_CLASS, FIGURE_CAPTION, uri
            )
        })
        .collect::<Vec<_>>()
        .join("")
}
