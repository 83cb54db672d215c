use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// LLM 后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Google Gemini 原生 REST 接口
    Gemini,
    /// 兼容 OpenAI 的网关
    OpenAiCompatible,
}

impl BackendKind {
    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Gemini => "Gemini",
            BackendKind::OpenAiCompatible => "OpenAI 兼容",
        }
    }

    /// 后端默认的 API 地址
    pub fn default_base_url(self) -> &'static str {
        match self {
            BackendKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            BackendKind::OpenAiCompatible => "https://api.openai.com/v1",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(BackendKind::Gemini),
            "openai" | "openai-compatible" | "openai_compatible" => {
                Ok(BackendKind::OpenAiCompatible)
            }
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 个人 API 密钥（优先）
    pub personal_api_key: Option<String>,
    /// 共享 API 密钥（个人密钥为空时使用）
    pub shared_api_key: Option<String>,
    /// 后端类型
    pub backend: BackendKind,
    /// API 基础 URL，为空时使用后端默认值
    pub api_base_url: Option<String>,
    /// 试卷请求（TOML）所在目录
    pub request_folder: String,
    /// 生成的 HTML 输出目录
    pub output_folder: String,
    /// 生成调用最多尝试次数（仅限流时重试）
    pub max_attempts: usize,
    /// 每次重试前等待的秒数
    pub retry_delay_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            personal_api_key: None,
            shared_api_key: None,
            backend: BackendKind::Gemini,
            api_base_url: None,
            request_folder: "paper_requests".to_string(),
            output_folder: "output_papers".to_string(),
            max_attempts: 3,
            retry_delay_secs: 5,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            personal_api_key: non_empty_env("PAPER_API_KEY"),
            shared_api_key: non_empty_env("GOOGLE_API_KEY"),
            backend: match non_empty_env("LLM_BACKEND") {
                Some(v) => v.parse()?,
                None => default.backend,
            },
            api_base_url: non_empty_env("LLM_API_BASE_URL"),
            request_folder: std::env::var("REQUEST_FOLDER").unwrap_or(default.request_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            max_attempts: parse_env("MAX_ATTEMPTS", "usize")?.unwrap_or(default.max_attempts),
            retry_delay_secs: parse_env("RETRY_DELAY_SECS", "u64")?
                .unwrap_or(default.retry_delay_secs),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
        })
    }

    /// 解析最终使用的 API 密钥
    ///
    /// 个人密钥优先，其次是共享密钥；都为空时返回 `MissingCredential`
    pub fn credential(&self) -> Result<&str, ConfigError> {
        self.personal_api_key
            .as_deref()
            .or(self.shared_api_key.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingCredential)
    }

    /// 实际使用的 API 基础 URL
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn non_empty_env(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match non_empty_env(var_name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
