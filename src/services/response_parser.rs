//! 响应解析 - 业务能力层
//!
//! 把模型返回的原始文本拆成题目和答案两部分，并把轻量标记统一成固定的 HTML 子集

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ParsedContent, BREAK_TOKEN};

static MARKDOWN_BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("invalid bold regex"));
static HEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*").expect("invalid heading regex"));

/// 四种下标写法，顺序固定：`$_{12}`、`$_12`、`_{12}`、`_2`
static SUBSCRIPT_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"\$_\{([^}]*)\}").expect("invalid subscript regex"),
        Regex::new(r"\$_(\d+)").expect("invalid subscript regex"),
        Regex::new(r"_\{([^}]*)\}").expect("invalid subscript regex"),
        Regex::new(r"_(\d+)").expect("invalid subscript regex"),
    ]
});

const LINE_BREAK: &str = "<br>";

/// 标记统一（换行之前的步骤）
fn normalize_markup(raw: &str) -> String {
    let text = MARKDOWN_BOLD.replace_all(raw, "<b>${1}</b>");
    let text = HEADING_MARKER.replace_all(&text, "");

    let mut text = text.into_owned();
    for pattern in SUBSCRIPT_PATTERNS.iter() {
        text = pattern.replace_all(&text, "<sub>${1}</sub>").into_owned();
    }

    // 下标写法去掉后残留的 `$`
    text.replace('$', "")
}

fn convert_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

/// 对一段文本做完整的统一处理
pub fn normalize(raw: &str) -> String {
    convert_line_breaks(&normalize_markup(raw))
}

/// 解析模型输出
///
/// 只按第一个分隔符拆分；后面再出现的分隔符原样留在答案部分。
/// 没有分隔符时全部作为题目，答案为空
pub fn parse(raw: &str) -> ParsedContent {
    let text = normalize_markup(raw);

    let (questions, answers) = match text.split_once(BREAK_TOKEN) {
        Some((questions, answers)) => (questions, answers),
        None => (text.as_str(), ""),
    };

    ParsedContent {
        questions_html: convert_line_breaks(questions),
        answers_html: convert_line_breaks(answers),
    }
}
