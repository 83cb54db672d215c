//! Gemini 原生 REST 客户端
//!
//! - 模型发现：`GET {base}/models`，按 `nextPageToken` 翻页
//! - 内容生成：`POST {base}/{model}:generateContent`，支持文本 + 内联图片

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clients::{looks_rate_limited, GenerationBackend};
use crate::error::GenerationError;
use crate::models::{GenerationRequest, ModelHandle, ModelInfo};

const API_KEY_HEADER: &str = "x-goog-api-key";
const PAGE_SIZE: &str = "1000";
/// 模型发现阶段的错误里没有模型名
const DISCOVERY: &str = "<discovery>";

/// Gemini 客户端
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<RemoteModel>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn generate_url(&self, model: &ModelHandle) -> String {
        let name = model.name();
        if name.starts_with("models/") {
            format!("{}/{}:generateContent", self.base_url, name)
        } else {
            format!("{}/models/{}:generateContent", self.base_url, name)
        }
    }
}

/// 把失败的 HTTP 响应映射成生成错误
///
/// 429 或 `RESOURCE_EXHAUSTED` / quota 视为限流，其余都是普通失败
fn map_http_failure(model: &str, status: StatusCode, body: &str) -> GenerationError {
    let (api_status, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.status, envelope.error.message),
        Err(_) => (String::new(), body.trim().to_string()),
    };

    let detail = format!("HTTP {}: {}", status.as_u16(), message);
    if status == StatusCode::TOO_MANY_REQUESTS
        || api_status == "RESOURCE_EXHAUSTED"
        || looks_rate_limited(&message)
    {
        GenerationError::rate_limited(model, detail)
    } else {
        GenerationError::request_failed(model, detail)
    }
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest {
    let mut parts = vec![Part::Text {
        text: request.prompt.clone(),
    }];
    if let Some(image) = &request.image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: BASE64.encode(&image.bytes),
            },
        });
    }
    GenerateContentRequest {
        contents: vec![Content { parts }],
    }
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .http
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&query)
                .send()
                .await
                .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

            if !status.is_success() {
                return Err(map_http_failure(DISCOVERY, status, &body));
            }

            let page: ListModelsResponse = serde_json::from_str(&body)
                .map_err(|e| GenerationError::request_failed(DISCOVERY, e.to_string()))?;

            models.extend(page.models.into_iter().map(|m| ModelInfo {
                name: m.name,
                supported_methods: m.supported_generation_methods,
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Gemini 返回 {} 个模型", models.len());
        Ok(models)
    }

    async fn generate(
        &self,
        model: &ModelHandle,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        debug!(
            "调用 Gemini API，模型: {}，提示词长度: {} 字符，图片: {}",
            model,
            request.prompt.len(),
            request.image.is_some()
        );

        let response = self
            .http
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| GenerationError::request_failed(model.name(), e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::request_failed(model.name(), e.to_string()))?;

        if !status.is_success() {
            let err = map_http_failure(model.name(), status, &body);
            warn!("Gemini API 调用失败: {}", err);
            return Err(err);
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::request_failed(model.name(), e.to_string()))?;

        extract_text(parsed).ok_or_else(|| GenerationError::EmptyContent {
            model: model.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationErrorKind;
    use crate::models::ImageData;

    #[test]
    fn test_map_http_failure_classification() {
        let err = map_http_failure("m", StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.kind(), GenerationErrorKind::RateLimited);

        let body = r#"{"error":{"code":400,"message":"Quota exceeded for metric","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_failure("m", StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), GenerationErrorKind::RateLimited);

        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let err = map_http_failure("m", StatusCode::FORBIDDEN, body);
        assert_eq!(err.kind(), GenerationErrorKind::Other);
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_build_body_with_image() {
        let request = GenerationRequest::with_image(
            "describe",
            ImageData {
                mime_type: "image/png".to_string(),
                bytes: b"hi".to_vec(),
            },
        );
        let json = serde_json::to_value(build_body(&request)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["data"], "aGk=");
    }

    #[test]
    fn test_extract_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Q1"},{"text":"[[BREAK]]1-A"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Q1[[BREAK]]1-A");

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(extract_text(empty).is_none());
    }

    #[test]
    fn test_list_models_response() {
        let page: ListModelsResponse = serde_json::from_str(
            r#"{"models":[{"name":"models/gemini-1.5-flash","supportedGenerationMethods":["generateContent"]}],"nextPageToken":"abc"}"#,
        )
        .unwrap();
        assert_eq!(page.models[0].name, "models/gemini-1.5-flash");
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_generate_url() {
        let client = GeminiClient::new("k", "https://example.com/v1beta/");
        assert_eq!(
            client.generate_url(&ModelHandle::new("models/gemini-1.5-flash")),
            "https://example.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            client.generate_url(&ModelHandle::new("gemini-pro")),
            "https://example.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    #[ignore] // 需要真实的 GOOGLE_API_KEY：cargo test -- --ignored
    async fn test_list_models_live() {
        let _ = tracing_subscriber::fmt::try_init();
        let key = std::env::var("GOOGLE_API_KEY").expect("GOOGLE_API_KEY 未设置");
        let client = GeminiClient::new(key, "https://generativelanguage.googleapis.com/v1beta");
        let models = client.list_models().await.unwrap();
        assert!(!models.is_empty());
    }
}
