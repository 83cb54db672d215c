//! 业务能力层（Services）
//!
//! 描述"我能做什么"，每个模块只做一件事，不持有跨动作的状态：
//!
//! - `model_selector` - 从账号模型列表中选择生成模型
//! - `prompt_builder` - 构建出卷提示词
//! - `response_parser` - 清洗模型输出并拆分题目 / 答案
//! - `manual_formatter` - 手动题目排版与续编号
//! - `image_loader` - 读取图片并转为 data URI
//! - `paper_renderer` - 渲染可打印的 HTML 试卷

pub mod image_loader;
pub mod manual_formatter;
pub mod model_selector;
pub mod paper_renderer;
pub mod prompt_builder;
pub mod response_parser;

pub use manual_formatter::{format_manual, format_manual_images, ManualBlock};
pub use model_selector::{choose_model, select_model};
pub use paper_renderer::{render, DocumentChrome, PaperMeta};
pub use prompt_builder::{build_diagram_prompt, build_prompt, Scope};
