//! # Paper Banao
//!
//! 一个用 AI 生成可打印试卷的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 远端生成服务，只暴露能力
//! - `GenerationBackend` - 列出模型 / 生成内容
//! - `GeminiClient` / `OpenAiCompatClient` - 两种具体后端
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，都是无状态的纯能力
//! - 选模型、构建提示词、解析输出、手动题目排版、图片读取、HTML 渲染
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整流程
//! - `PaperFlow` - 流程编排（select → prompt → generate → parse → format → render）
//! - `RetryPolicy` / `Sleeper` - 限流重试
//! - `SessionState` - 调用方持有的会话历史
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 加载请求、顺序生成、写出文件、统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{build_backend, GenerationBackend};
pub use config::{BackendKind, Config};
pub use error::{AppError, AppResult};
pub use models::{GenerationConfig, PaperFormat, PaperRequest, ParsedContent};
pub use orchestrator::{App, RunStats};
pub use workflow::{GeneratedPaper, PaperFlow, RetryPolicy, SessionState, Sleeper};
