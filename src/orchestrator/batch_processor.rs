//! 批量出卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责试卷请求的加载、调度和结果落盘。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：读取配置、创建后端和出卷流程
//! 2. **批量加载**：扫描文件夹中的所有 TOML 请求，或只加载单个文件
//! 3. **顺序处理**：一次只进行一个生成动作，上一份完成后再开始下一份
//! 4. **结果落盘**：HTML 写入输出目录，并追加到会话历史
//! 5. **全局统计**：汇总成功 / 失败数量

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    load_all_paper_requests, load_paper_request, GenerationConfig, ImageSource, PaperRequest,
};
use crate::services::image_loader::load_image;
use crate::services::paper_renderer::{self, DocumentChrome};
use crate::utils::logging::{log_requests_loaded, log_startup, print_final_stats};
use crate::workflow::{PaperFlow, SessionState};

/// 应用主结构
pub struct App {
    config: Config,
    flow: PaperFlow,
    session: SessionState,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用（没有 API 密钥时在任何网络调用之前失败）
    pub fn initialize(config: Config) -> Result<Self> {
        let flow = PaperFlow::from_config(&config)?;
        log_startup(config.backend.label(), &config.output_folder);
        Ok(Self::with_flow(config, flow))
    }

    /// 使用现成的出卷流程创建应用
    pub fn with_flow(config: Config, flow: PaperFlow) -> Self {
        Self {
            config,
            flow,
            session: SessionState::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// 运行主逻辑
    ///
    /// `source` 可以是单个 TOML 文件或一个文件夹；为空时使用配置中的请求目录
    pub async fn run(&mut self, source: Option<&Path>) -> Result<RunStats> {
        let requests = self.load_requests(source).await?;

        if requests.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(RunStats::default());
        }

        log_requests_loaded(requests.len());

        let mut stats = RunStats {
            total: requests.len(),
            ..Default::default()
        };

        for (idx, request) in requests.iter().enumerate() {
            let index = idx + 1;
            info!("\n{}", "─".repeat(60));
            info!(
                "[试卷 {}/{}] 📝 {} / {}",
                index,
                stats.total,
                request.generation.exam_name,
                request.generation.subject
            );

            match self.generate_one(request).await {
                Ok(path) => {
                    info!("[试卷 {}] ✅ 已保存: {}", index, path.display());
                    stats.success += 1;
                }
                Err(e) => {
                    error!("[试卷 {}] ❌ 生成失败: {:#}", index, e);
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_folder,
        );

        Ok(stats)
    }

    /// 生成一份试卷并写入输出目录
    pub async fn generate_one(&mut self, request: &PaperRequest) -> Result<PathBuf> {
        self.session.manual_draft = request.manual.text.clone();

        let paper = self.flow.run(request).await?;

        let path = self.write_output(&paper.file_name, &paper.html).await?;
        self.session.record(paper.file_name, paper.html);
        Ok(path)
    }

    /// 看图出题：结果渲染成只含 AI 内容的试卷
    pub async fn generate_from_diagram(
        &mut self,
        image_path: &Path,
        config: GenerationConfig,
    ) -> Result<PathBuf> {
        let image = load_image(&ImageSource::Path(image_path.to_path_buf())).await?;
        let parsed = self.flow.generate_from_diagram(&image, &config).await?;

        let request = PaperRequest {
            generation: config,
            ..Default::default()
        };
        let chrome = DocumentChrome::new(&request.header, &request.generation, None);
        let html = paper_renderer::render(&parsed, "", "", &chrome, request.generation.format);

        let file_name = format!("Diagram_{}", request.output_file_name());
        let path = self.write_output(&file_name, &html).await?;
        self.session.record(file_name, html);
        Ok(path)
    }

    /// 列出账号下的模型并标出会被选中的模型
    pub async fn show_models(&self) -> Result<()> {
        let (models, chosen) = self.flow.discover_models().await?;
        info!("📋 共 {} 个模型", models.len());
        for model in &models {
            let mark = match &chosen {
                Some(handle) if handle.name() == model.name => "👉",
                _ => "  ",
            };
            info!(
                "{} {} [{}]",
                mark,
                model.name,
                model.supported_methods.join(", ")
            );
        }
        match chosen {
            Some(handle) => info!("✓ 将使用模型: {}", handle),
            None => warn!("⚠️ 没有支持内容生成的模型"),
        }
        Ok(())
    }

    async fn load_requests(&self, source: Option<&Path>) -> Result<Vec<PaperRequest>> {
        let source = source
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.config.request_folder));

        info!("\n📁 正在扫描试卷请求: {}", source.display());
        if source.is_file() {
            Ok(vec![load_paper_request(&source).await?])
        } else {
            load_all_paper_requests(&source.to_string_lossy()).await
        }
    }

    async fn write_output(&self, file_name: &str, html: &str) -> AppResult<PathBuf> {
        let folder = PathBuf::from(&self.config.output_folder);
        fs::create_dir_all(&folder)
            .await
            .map_err(|e| AppError::file_write_failed(folder.display().to_string(), e))?;

        let path = folder.join(file_name);
        fs::write(&path, html)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        Ok(path)
    }
}
