//! 模型选择 - 业务能力层
//!
//! 从远端账号可见的模型中确定性地选出一个可用于内容生成的模型

use tracing::{debug, info, warn};

use crate::clients::GenerationBackend;
use crate::error::DiscoveryError;
use crate::models::{ModelHandle, ModelInfo};

/// 低延迟模型系列（最优先）
const FAST_FAMILY: &str = "gemini-1.5-flash";
/// 中档 pro 系列
const PRO_FAMILY: &str = "gemini-1.5-pro";
/// 通用名称片段
const GENERIC_FAMILY: &str = "gemini";

/// 模型优先级，数值越小越优先
fn priority(name: &str) -> u8 {
    let short = name.strip_prefix("models/").unwrap_or(name);
    if short == FAST_FAMILY {
        0
    } else if short.contains(FAST_FAMILY) {
        1
    } else if short.contains(PRO_FAMILY) {
        2
    } else if short.contains(GENERIC_FAMILY) {
        3
    } else {
        4
    }
}

/// 按优先级选择模型
///
/// 只考虑支持 `generateContent` 的模型；同一优先级内按名称字典序取最小，
/// 所以结果与发现顺序无关
pub fn choose_model(models: &[ModelInfo]) -> Option<ModelHandle> {
    models
        .iter()
        .filter(|m| m.supports_generation())
        .min_by(|a, b| {
            priority(&a.name)
                .cmp(&priority(&b.name))
                .then_with(|| a.name.cmp(&b.name))
        })
        .map(|m| ModelHandle::new(m.name.clone()))
}

/// 发现并选择模型
///
/// 列举模型本身失败时按"没有模型"处理，不向上抛出
pub async fn select_model(backend: &dyn GenerationBackend) -> Result<ModelHandle, DiscoveryError> {
    let models = match backend.list_models().await {
        Ok(models) => models,
        Err(e) => {
            warn!("⚠️ 模型列表获取失败，按无可用模型处理: {}", e);
            Vec::new()
        }
    };

    debug!("发现 {} 个模型", models.len());

    let chosen = choose_model(&models).ok_or(DiscoveryError::NoModelAvailable)?;
    info!("🤖 使用模型: {}", chosen);
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gen(name: &str) -> ModelInfo {
        ModelInfo::new(name, &["generateContent", "countTokens"])
    }

    fn embed_only(name: &str) -> ModelInfo {
        ModelInfo::new(name, &["embedContent"])
    }

    #[test]
    fn test_exact_fast_family_wins() {
        let models = vec![
            gen("models/gemini-1.5-pro"),
            gen("models/gemini-1.5-flash-latest"),
            gen("models/gemini-1.5-flash"),
            gen("models/gemini-1.0-pro"),
        ];
        assert_eq!(
            choose_model(&models).unwrap().name(),
            "models/gemini-1.5-flash"
        );
    }

    #[test]
    fn test_pro_before_generic() {
        let models = vec![
            gen("models/gemini-1.0-pro-vision"),
            gen("models/gemini-1.5-pro-002"),
            gen("models/text-bison"),
        ];
        assert_eq!(
            choose_model(&models).unwrap().name(),
            "models/gemini-1.5-pro-002"
        );
    }

    #[test]
    fn test_generic_then_any() {
        let models = vec![gen("models/text-bison"), gen("models/gemini-2.0-flash")];
        assert_eq!(
            choose_model(&models).unwrap().name(),
            "models/gemini-2.0-flash"
        );

        let models = vec![gen("models/zeta"), gen("models/alpha")];
        assert_eq!(choose_model(&models).unwrap().name(), "models/alpha");
    }

    #[test]
    fn test_capability_filter() {
        let models = vec![
            embed_only("models/gemini-1.5-flash"),
            gen("models/gemini-1.0-pro"),
        ];
        assert_eq!(
            choose_model(&models).unwrap().name(),
            "models/gemini-1.0-pro"
        );

        let models = vec![embed_only("models/embedding-001")];
        assert!(choose_model(&models).is_none());
        assert!(choose_model(&[]).is_none());
    }

    #[test]
    fn test_selection_is_order_independent() {
        let base = vec![
            gen("models/gemini-1.5-flash-8b"),
            gen("models/gemini-1.5-flash-001"),
            gen("models/gemini-1.5-pro"),
            gen("models/gemini-pro"),
            gen("models/chat-bison"),
            embed_only("models/gemini-1.5-flash"),
        ];
        let expected = choose_model(&base).unwrap();
        assert_eq!(expected.name(), "models/gemini-1.5-flash-001");

        // 所有旋转和反转排列下结果都不变
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            assert_eq!(choose_model(&rotated).unwrap(), expected);
            rotated.reverse();
            assert_eq!(choose_model(&rotated).unwrap(), expected);
        }
    }
}
