//! 出卷流程 - 流程层
//!
//! 核心职责：定义一次"生成"动作的完整流程
//!
//! 流程顺序：
//! 1. 前置检查（没有可生成内容时直接返回，不做任何网络调用）
//! 2. 选择模型 → 构建提示词 → 生成（限流重试）→ 解析
//! 3. 手动题目接着 AI 题号继续编号，手动图片追加在后
//! 4. 渲染成完整文档

use tracing::{debug, info};

use crate::clients::{build_backend, GenerationBackend};
use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::models::{
    GenerationConfig, GenerationRequest, ImageData, ImageSource, ModelHandle, ModelInfo,
    PaperRequest, ParsedContent,
};
use crate::services::image_loader::load_data_uris;
use crate::services::manual_formatter::{format_manual, format_manual_images};
use crate::services::paper_renderer::{self, DocumentChrome};
use crate::services::{model_selector, prompt_builder, response_parser};
use crate::utils::logging::truncate_text;
use crate::workflow::retry::{generate_with_retry, RetryPolicy, Sleeper, TokioSleeper};

/// 一次生成的结果
#[derive(Debug, Clone)]
pub struct GeneratedPaper {
    /// 下载文件名
    pub file_name: String,
    /// 完整 HTML 文档
    pub html: String,
    /// 解析后的 AI 内容
    pub parsed: ParsedContent,
    /// 使用的模型（没有请求 AI 题目时为 None）
    pub model: Option<ModelHandle>,
    /// 手动题目数量
    pub manual_count: usize,
}

/// 手动题目的起始题号
///
/// 按解析结果中实际的 `question-item` 块计数；
/// 模型没有按约定输出题目块时退回到请求的题目数量
pub fn manual_start_number(parsed: &ParsedContent, requested: u32) -> usize {
    let counted = parsed.question_block_count();
    let ai_count = if counted > 0 {
        counted
    } else {
        requested as usize
    };
    ai_count + 1
}

/// 出卷流程
///
/// - 不持有任何跨动作的状态
/// - 只依赖生成服务能力（backend）和等待能力（sleeper）
pub struct PaperFlow {
    backend: Box<dyn GenerationBackend>,
    retry_policy: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl PaperFlow {
    pub fn new(backend: Box<dyn GenerationBackend>, retry_policy: RetryPolicy) -> Self {
        Self {
            backend,
            retry_policy,
            sleeper: Box::new(TokioSleeper),
        }
    }

    /// 根据程序配置创建流程，没有 API 密钥时返回配置错误
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let backend = build_backend(config)?;
        let policy = RetryPolicy {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
        };
        Ok(Self::new(backend, policy))
    }

    /// 替换等待实现
    pub fn with_sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// 执行一次生成
    pub async fn run(&self, request: &PaperRequest) -> AppResult<GeneratedPaper> {
        let config = &request.generation;
        let total = config.total_questions();

        if total == 0 && request.manual.is_empty() {
            return Err(ConfigError::NothingToGenerate.into());
        }

        let (parsed, model) = if total > 0 {
            let model = model_selector::select_model(self.backend.as_ref()).await?;
            let prompt = prompt_builder::build_prompt(config);
            debug!("提示词: {}", truncate_text(&prompt, 200));

            info!("🤖 正在生成 {} 道题目...", total);
            let raw = self
                .generate(&model, &GenerationRequest::text(prompt))
                .await?;
            debug!("模型返回 {} 字符", raw.len());

            (response_parser::parse(&raw), Some(model))
        } else {
            info!("💡 未请求 AI 题目，只排版手动内容");
            (ParsedContent::default(), None)
        };

        if total > 0 && !parsed.has_answers() {
            info!("⚠️ 模型输出中没有答案分隔符，试卷不含答案页");
        }

        let start_number = manual_start_number(&parsed, total);
        let manual = format_manual(
            &request.manual.text,
            start_number,
            request.manual.option_layout,
        );
        if manual.count > 0 {
            info!(
                "✍️ 手动题目 {} 道，题号从 Q{} 开始",
                manual.count, start_number
            );
        }

        let image_sources: Vec<ImageSource> = request
            .manual
            .images
            .iter()
            .cloned()
            .map(ImageSource::Path)
            .collect();
        let images_html = format_manual_images(&load_data_uris(&image_sources).await);

        let logo = match &request.header.logo {
            Some(path) => load_data_uris(&[ImageSource::Path(path.clone())])
                .await
                .into_iter()
                .next(),
            None => None,
        };

        let chrome = DocumentChrome::new(&request.header, config, logo);
        let html = paper_renderer::render(
            &parsed,
            &manual.html,
            &images_html,
            &chrome,
            config.format,
        );

        Ok(GeneratedPaper {
            file_name: request.output_file_name(),
            html,
            parsed,
            model,
            manual_count: manual.count,
        })
    }

    /// 看图出题：图片和提示词一起发送，结果按普通输出解析
    pub async fn generate_from_diagram(
        &self,
        image: &ImageData,
        config: &GenerationConfig,
    ) -> AppResult<ParsedContent> {
        let model = model_selector::select_model(self.backend.as_ref()).await?;
        let prompt = prompt_builder::build_diagram_prompt(config);

        info!("🖼️ 正在根据图片生成题目...");
        let raw = self
            .generate(&model, &GenerationRequest::with_image(prompt, image.clone()))
            .await?;

        Ok(response_parser::parse(&raw))
    }

    /// 列出可用模型以及会被选中的模型
    pub async fn discover_models(&self) -> AppResult<(Vec<ModelInfo>, Option<ModelHandle>)> {
        let models = self.backend.list_models().await?;
        let chosen = model_selector::choose_model(&models);
        Ok((models, chosen))
    }

    async fn generate(&self, model: &ModelHandle, request: &GenerationRequest) -> AppResult<String> {
        let text = generate_with_retry(
            self.backend.as_ref(),
            model,
            request,
            self.retry_policy,
            self.sleeper.as_ref(),
        )
        .await?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_start_counts_actual_blocks() {
        let parsed = ParsedContent {
            questions_html: "<div class='question-item'>1</div><div class='question-item'>2</div>"
                .to_string(),
            answers_html: String::new(),
        };
        // 请求 5 道、实际返回 2 道时，手动题目从 Q3 开始
        assert_eq!(manual_start_number(&parsed, 5), 3);
    }

    #[test]
    fn test_manual_start_falls_back_to_requested() {
        let parsed = ParsedContent {
            questions_html: "<b>Q1.</b> untagged<br><b>Q2.</b> untagged".to_string(),
            answers_html: String::new(),
        };
        assert_eq!(manual_start_number(&parsed, 5), 6);
        assert_eq!(manual_start_number(&ParsedContent::default(), 0), 1);
    }
}
