//! 远端生成服务的数据结构

use crate::models::content::ImageData;

/// 需要的能力：内容生成
pub const GENERATE_CONTENT: &str = "generateContent";

/// 模型发现结果中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub supported_methods: Vec<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, supported_methods: &[&str]) -> Self {
        Self {
            name: name.into(),
            supported_methods: supported_methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn supports_generation(&self) -> bool {
        self.supported_methods.iter().any(|m| m == GENERATE_CONTENT)
    }
}

/// 选中的模型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelHandle(String);

impl ModelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一次生成请求（重试时原样重发）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImageData>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(prompt: impl Into<String>, image: ImageData) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}
