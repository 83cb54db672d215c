//! 远端生成服务客户端 - 基础设施层
//!
//! 只暴露"列出模型"和"生成文本"两种能力；
//! 原始 HTTP/API 失败在这里一次性映射成 `GenerationError`

pub mod gemini_client;
pub mod openai_compat_client;

use async_trait::async_trait;

use crate::config::{BackendKind, Config};
use crate::error::{ConfigError, GenerationError};
use crate::models::{GenerationRequest, ModelHandle, ModelInfo};

pub use gemini_client::GeminiClient;
pub use openai_compat_client::OpenAiCompatClient;

/// 生成服务能力
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 列出当前凭据可见的所有模型
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError>;

    /// 生成文本（请求可以带一张图片）
    async fn generate(
        &self,
        model: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;
}

/// 根据配置创建后端
///
/// 没有可用密钥时直接返回 `MissingCredential`，不做任何网络调用
pub fn build_backend(config: &Config) -> Result<Box<dyn GenerationBackend>, ConfigError> {
    let api_key = config.credential()?;
    let backend: Box<dyn GenerationBackend> = match config.backend {
        BackendKind::Gemini => Box::new(GeminiClient::new(api_key, config.base_url())),
        BackendKind::OpenAiCompatible => {
            Box::new(OpenAiCompatClient::new(api_key, config.base_url()))
        }
    };
    Ok(backend)
}

/// 根据错误信息判断是否属于限流
///
/// 只在客户端边界使用，用于上游不返回结构化状态码的情况
pub(crate) fn looks_rate_limited(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["429", "quota", "rate limit", "resource_exhausted"]
        .iter()
        .any(|needle| lower.contains(needle))
}
