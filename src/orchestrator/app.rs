//! 应用编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量求解请求的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、启动浏览器、构造各协作者客户端（只构造一次）
//! 2. **请求校验**：字段完整性检查和共享密钥比对，不属于求解流水线本身
//! 3. **并发控制**：使用 Semaphore 限制同时处理的请求数量
//! 4. **结果记录**：每个请求的结果写入结果日志
//! 5. **资源管理**：唯一持有浏览器引擎，关闭时统一释放
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个请求的细节，委托给 `QuizFlow`
//! - **并发安全**：QuizFlow 可克隆，每个任务持有自己的一份

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use url::Url;

use crate::browser::{BrowserEngine, BrowserFetcher};
use crate::clients::{HttpClient, LlmClient, PdfTextParser};
use crate::config::Config;
use crate::error::PipelineStage;
use crate::models::{SolveFailure, SolveReport, SolveRequest};
use crate::services::ReportWriter;
use crate::utils::logging;
use crate::workflow::{QuizCtx, QuizFlow};

/// 单个请求的处理结果
pub type SolveOutcome = Result<SolveReport, SolveFailure>;

/// 应用主结构
pub struct App {
    config: Config,
    engine: Option<Arc<BrowserEngine>>,
    flow: QuizFlow,
    report_writer: ReportWriter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        let report_writer = ReportWriter::new(config.output_log_file.clone());
        report_writer
            .init()
            .with_context(|| format!("初始化结果日志失败: {}", config.output_log_file))?;

        logging::log_startup(config.max_concurrent_requests, &config.llm_model_name);

        // 浏览器引擎进程内唯一，各请求从中领取独立上下文
        let engine = Arc::new(BrowserEngine::start(&config).await?);

        let http = Arc::new(HttpClient::new(&config)?);
        let flow = QuizFlow::new(
            Arc::new(BrowserFetcher::new(engine.clone(), &config)),
            http.clone(),
            Arc::new(LlmClient::new(&config)),
            Arc::new(PdfTextParser::new()),
            http,
            &config.default_origin,
        );

        Ok(Self {
            config,
            engine: Some(engine),
            flow,
            report_writer,
        })
    }

    /// 使用已组装好的流程创建应用，不启动浏览器
    pub fn with_flow(config: Config, flow: QuizFlow) -> Self {
        let report_writer = ReportWriter::new(config.output_log_file.clone());
        Self {
            config,
            engine: None,
            flow,
            report_writer,
        }
    }

    /// 处理单个请求
    pub async fn solve(&self, request: SolveRequest) -> SolveOutcome {
        process_request(&self.flow, &self.config, &self.report_writer, request, 1).await
    }

    /// 并发处理一批请求，结果顺序与输入一致
    pub async fn solve_all(&self, requests: Vec<SolveRequest>) -> Vec<SolveOutcome> {
        if requests.is_empty() {
            warn!("⚠️ 没有待处理的请求");
            return Vec::new();
        }

        let max_concurrent = self.config.max_concurrent_requests.max(1);
        info!("✓ 共 {} 个请求，最多同时处理 {} 个", requests.len(), max_concurrent);

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut handles = Vec::with_capacity(requests.len());

        for (idx, request) in requests.into_iter().enumerate() {
            let request_index = idx + 1;
            let semaphore = semaphore.clone();
            let flow = self.flow.clone();
            let config = self.config.clone();
            let report_writer = self.report_writer.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                process_request(&flow, &config, &report_writer, request, request_index).await
            });
            handles.push((request_index, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (request_index, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[请求 #{}] 任务执行失败: {}", request_index, e);
                    Err(SolveFailure::new(
                        PipelineStage::Solve,
                        format!("任务执行失败: {}", e),
                    ))
                }
            };
            outcomes.push(outcome);
        }

        let success = outcomes.iter().filter(|o| o.is_ok()).count();
        logging::print_final_stats(success, outcomes.len() - success, self.report_writer.path());
        outcomes
    }

    /// 关闭应用，释放浏览器
    pub async fn shutdown(self) {
        let Self { engine, flow, .. } = self;
        // 流程中的抓取器持有引擎引用，先释放
        drop(flow);

        if let Some(engine) = engine {
            match Arc::try_unwrap(engine) {
                Ok(engine) => engine.shutdown().await,
                Err(_) => warn!("⚠️ 浏览器引擎仍被引用，跳过关闭"),
            }
        }
    }
}

async fn process_request(
    flow: &QuizFlow,
    config: &Config,
    report_writer: &ReportWriter,
    request: SolveRequest,
    request_index: usize,
) -> SolveOutcome {
    let ctx = QuizCtx::new(request_index, request.url.clone());

    let outcome = match check_request(&request, config) {
        Err(failure) => Err(failure),
        Ok(()) => flow.run(&request, &ctx).await.map_err(SolveFailure::from),
    };

    match &outcome {
        Ok(report) => info!("{} ✅ 处理完成 (策略: {})", ctx, report.strategy),
        Err(failure) => error!("{} ❌ 阶段 {} 失败: {}", ctx, failure.stage, failure.reason),
    }
    report_writer.record(&request.url, &outcome);
    outcome
}

/// 校验请求字段和共享密钥
fn check_request(request: &SolveRequest, config: &Config) -> Result<(), SolveFailure> {
    for (name, value) in [
        ("email", &request.email),
        ("secret", &request.secret),
        ("url", &request.url),
    ] {
        if value.trim().is_empty() {
            return Err(SolveFailure::new(
                PipelineStage::Request,
                format!("缺少字段: {}", name),
            ));
        }
    }

    match Url::parse(&request.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => {
            return Err(SolveFailure::new(
                PipelineStage::Request,
                format!("无效的题目地址: {}", request.url),
            ))
        }
    }

    if request.secret != config.secret || request.email != config.email {
        return Err(SolveFailure::new(PipelineStage::Auth, "邮箱或密钥不匹配"));
    }
    Ok(())
}
