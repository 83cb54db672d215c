//! 兼容 OpenAI API 的客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 chat completion 调用（支持图片）
//! - 模型列表直接请求 `GET {base}/models`
//! - 兼容 OpenAI API 的网关（如 Azure, Gemini, Doubao 等）列出的模型都视为可生成

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::{looks_rate_limited, GenerationBackend};
use crate::error::GenerationError;
use crate::models::{GenerationRequest, ModelHandle, ModelInfo, GENERATE_CONTENT};
use crate::services::image_loader::to_data_uri;

const DISCOVERY: &str = "<discovery>";

/// OpenAI 兼容客户端
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAiCompatClient {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let api_base = api_base.into().trim_end_matches('/').to_string();

        let openai_config = OpenAIConfig::new()
            .with_api_key(&api_key)
            .with_api_base(&api_base);

        Self {
            client: Client::with_config(openai_config),
            http: reqwest::Client::new(),
            api_key,
            api_base,
        }
    }
}

/// 按错误信息分类
fn map_failure(model: &str, message: String) -> GenerationError {
    if looks_rate_limited(&message) {
        GenerationError::rate_limited(model, message)
    } else {
        GenerationError::request_failed(model, message)
    }
}

fn build_user_message(
    model: &str,
    request: &GenerationRequest,
) -> Result<ChatCompletionRequestMessage, GenerationError> {
    let builder_failed = |e: async_openai::error::OpenAIError| {
        GenerationError::request_failed(model, e.to_string())
    };

    let user_msg = match &request.image {
        Some(image) => {
            // Vision：文本 + 图片
            let content_parts = vec![
                ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: request.prompt.clone(),
                    },
                ),
                ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: to_data_uri(image),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ),
            ];
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                .build()
                .map_err(builder_failed)?
        }
        None => ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt.as_str())
            .build()
            .map_err(builder_failed)?,
    };

    Ok(ChatCompletionRequestMessage::User(user_msg))
}

#[async_trait]
impl GenerationBackend for OpenAiCompatClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let response = self
            .http
            .get(format!("{}/models", self.api_base))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

        if !status.is_success() {
            return Err(map_failure(
                DISCOVERY,
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        let list: ModelList = serde_json::from_str(&body)
            .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ModelInfo::new(m.id, &[GENERATE_CONTENT]))
            .collect())
    }

    async fn generate(
        &self,
        model: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        debug!(
            "调用 LLM API，模型: {}，提示词长度: {} 字符，图片: {}",
            model,
            request.prompt.len(),
            request.image.is_some()
        );

        let message = build_user_message(model.name(), request)?;

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model.name())
            .messages(vec![message])
            .temperature(0.7)
            .build()
            .map_err(|e| GenerationError::request_failed(model.name(), e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                map_failure(model.name(), e.to_string())
            })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::EmptyContent {
                model: model.name().to_string(),
            })
    }
}
