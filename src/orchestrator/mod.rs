//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 加载试卷请求、顺序调度出卷流程、写出结果、维护会话历史并输出统计。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PaperRequest>)
//!     ↓
//! workflow::PaperFlow (处理单次生成)
//!     ↓
//! services (能力层：选模型 / 提示词 / 解析 / 排版 / 渲染)
//!     ↓
//! clients (基础设施：GenerationBackend)
//! ```

pub mod batch_processor;

pub use batch_processor::{App, RunStats};
