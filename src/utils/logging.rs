//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose {
        "paper_banao=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(backend: &str, output_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 试卷生成模式");
    info!("🔌 LLM 后端: {}", backend);
    info!("📂 输出目录: {}", output_folder);
    info!("{}", "=".repeat(60));
}

/// 记录试卷请求加载信息
pub fn log_requests_loaded(total: usize) {
    info!("✓ 找到 {} 个试卷请求", total);
    info!("💡 按顺序逐个生成\n");
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize, output_folder: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n试卷已保存至: {}", output_folder);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
