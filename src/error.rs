use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（在任何网络调用之前报告）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 模型发现错误
    #[error("模型发现错误: {0}")]
    Discovery(#[from] DiscoveryError),
    /// 生成服务错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未提供 API 密钥（个人密钥和共享密钥都没有）
    #[error("未找到 API 密钥，请设置 PAPER_API_KEY 或 GOOGLE_API_KEY")]
    MissingCredential,
    /// 题目数量为 0 且没有手动内容
    #[error("没有需要生成的内容：AI 题目数量为 0 且没有手动题目或图片")]
    NothingToGenerate,
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 不支持的后端类型
    #[error("不支持的 LLM 后端: {0}")]
    UnknownBackend(String),
}

/// 模型发现错误
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// 账号下没有支持内容生成的模型
    #[error("没有可用的 AI 模型（账号下没有支持 generateContent 的模型）")]
    NoModelAvailable,
}

/// 生成失败的分类
///
/// 重试策略只看这个分类，不再解析错误字符串
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    /// 限流 / 配额耗尽（429）
    RateLimited,
    /// 其他错误
    Other,
}

/// 生成服务错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 远端限流
    #[error("请求频率受限 (模型: {model}): {message}")]
    RateLimited { model: String, message: String },
    /// 请求失败（网络、鉴权、参数等）
    #[error("API 调用失败 (模型: {model}): {message}")]
    RequestFailed { model: String, message: String },
    /// 返回内容为空
    #[error("LLM 返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 重试次数耗尽
    #[error("请求频率受限，已尝试 {attempts} 次仍失败 (模型: {model}): {message}")]
    RetriesExhausted {
        model: String,
        attempts: usize,
        message: String,
    },
}

impl GenerationError {
    /// 返回错误分类
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            GenerationError::RateLimited { .. } => GenerationErrorKind::RateLimited,
            _ => GenerationErrorKind::Other,
        }
    }

    /// 创建限流错误
    pub fn rate_limited(model: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::RateLimited {
            model: model.into(),
            message: message.into(),
        }
    }

    /// 创建请求失败错误
    pub fn request_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::RequestFailed {
            model: model.into(),
            message: message.into(),
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
