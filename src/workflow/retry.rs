//! 生成调用的重试策略
//!
//! 只有限流错误会重试：固定次数、固定间隔、原样重发同一个请求

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use crate::clients::GenerationBackend;
use crate::error::{GenerationError, GenerationErrorKind};
use crate::models::{GenerationRequest, ModelHandle};

/// 重试前等待的能力
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 计时器的等待
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最多尝试次数（包括第一次）
    pub max_attempts: usize,
    /// 每次重试前的固定等待
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// 调用生成服务，限流时按策略重试
pub async fn generate_with_retry(
    backend: &dyn GenerationBackend,
    model: &ModelHandle,
    request: &GenerationRequest,
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<String, GenerationError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match backend.generate(model, request).await {
            Ok(text) => {
                if attempt > 1 {
                    info!("✓ 第 {} 次尝试成功", attempt);
                }
                return Ok(text);
            }
            Err(e) if e.kind() == GenerationErrorKind::RateLimited => {
                if attempt >= max_attempts {
                    warn!("❌ 请求频率受限，已尝试 {} 次，放弃", attempt);
                    return Err(GenerationError::RetriesExhausted {
                        model: model.name().to_string(),
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                warn!(
                    "⏳ 请求频率受限 (尝试 {}/{}), 等待 {} 秒后重试...",
                    attempt,
                    max_attempts,
                    policy.delay.as_secs()
                );
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
