use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use paper_banao::models::{Difficulty, DifficultyLevel, GenerationConfig, Language, PaperFormat};
use paper_banao::utils::logging;
use paper_banao::{App, BackendKind, Config};

#[derive(Parser, Debug)]
#[command(name = "paper_banao", version, about = "用 AI 生成可打印的试卷")]
struct Cli {
    /// API 密钥（覆盖 PAPER_API_KEY）
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// LLM 后端：gemini | openai（覆盖 LLM_BACKEND）
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// 输出目录（覆盖 OUTPUT_FOLDER）
    #[arg(long, global = true)]
    output: Option<String>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 根据 TOML 请求生成试卷（单个文件或整个文件夹）
    Generate {
        /// 请求文件或文件夹，默认使用 REQUEST_FOLDER
        path: Option<PathBuf>,
    },
    /// 根据一张图表图片生成题目
    Diagram {
        /// 图片路径
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "")]
        exam: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        topic: String,
        /// Hindi | English | Bilingual
        #[arg(long, default_value = "English", value_parser = parse_language)]
        language: Language,
        /// Easy | Medium | Hard
        #[arg(long, default_value = "Medium", value_parser = parse_level)]
        difficulty: DifficultyLevel,
    },
    /// 列出可用模型以及会被选中的模型
    Models,
}

fn parse_language(value: &str) -> Result<Language, String> {
    match value.trim().to_lowercase().as_str() {
        "hindi" => Ok(Language::Hindi),
        "english" => Ok(Language::English),
        "bilingual" => Ok(Language::Bilingual),
        other => Err(format!("未知的语言: {}", other)),
    }
}

fn parse_level(value: &str) -> Result<DifficultyLevel, String> {
    match value.trim().to_lowercase().as_str() {
        "easy" => Ok(DifficultyLevel::Easy),
        "medium" => Ok(DifficultyLevel::Medium),
        "hard" => Ok(DifficultyLevel::Hard),
        other => Err(format!("未知的难度: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env()?;
    if let Some(key) = cli.api_key {
        config.personal_api_key = Some(key);
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(output) = cli.output {
        config.output_folder = output;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    let mut app = App::initialize(config)?;

    match cli.command {
        Command::Generate { path } => {
            let stats = app.run(path.as_deref()).await?;
            if stats.total > 0 && stats.success == 0 {
                anyhow::bail!("所有试卷均生成失败");
            }
        }
        Command::Diagram {
            image,
            exam,
            subject,
            topic,
            language,
            difficulty,
        } => {
            let generation = GenerationConfig {
                exam_name: exam,
                subject,
                topic,
                language,
                difficulty: Difficulty::Global { level: difficulty },
                format: PaperFormat::StandardCustom,
                ..Default::default()
            };
            let path = app.generate_from_diagram(&image, generation).await?;
            tracing::info!("✅ 已保存: {}", path.display());
        }
        Command::Models => app.show_models().await?,
    }

    Ok(())
}
