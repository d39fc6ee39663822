//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一个求解请求"的完整处理流程
//!
//! 流程顺序：
//! 1. 抓取题目页面
//! 2. LLM 分类
//! 3. 路由到求解策略（请求可显式指定策略）
//! 4. 求解
//! 5. 提交答案
//!
//! 各阶段严格串行，任一阶段失败即终止本次请求，不重试。

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::{DocumentParser, Downloader, LanguageModel, PageFetcher, SubmissionClient};
use crate::error::{QuizError, QuizResult};
use crate::models::{
    Answer, Classification, QuizPage, SolveReport, SolveRequest, StrategyKind, Submission,
};
use crate::services::{route, SubmissionAssembler, TaskClassifier};
use crate::strategies::{DocumentStrategy, ScrapingStrategy, SimpleStrategy, TabularStrategy};
use crate::utils::logging::truncate_text;
use crate::workflow::quiz_ctx::QuizCtx;

/// 题目处理流程
///
/// - 编排完整的求解流程
/// - 决定使用哪种策略、何时提交
/// - 不持有浏览器上下文，只依赖注入的协作者
/// - 可廉价克隆，并发请求共享同一组协作者
#[derive(Clone)]
pub struct QuizFlow {
    fetcher: Arc<dyn PageFetcher>,
    classifier: TaskClassifier,
    simple: Arc<SimpleStrategy>,
    scraping: Arc<ScrapingStrategy>,
    tabular: Arc<TabularStrategy>,
    document: Arc<DocumentStrategy>,
    submitter: SubmissionAssembler,
}

impl QuizFlow {
    /// 用启动时构造好的协作者组装流程
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        downloader: Arc<dyn Downloader>,
        llm: Arc<dyn LanguageModel>,
        parser: Arc<dyn DocumentParser>,
        submission_client: Arc<dyn SubmissionClient>,
        default_origin: &str,
    ) -> Self {
        Self {
            fetcher: fetcher.clone(),
            classifier: TaskClassifier::new(llm.clone()),
            simple: Arc::new(SimpleStrategy::new(llm.clone())),
            scraping: Arc::new(ScrapingStrategy::new(llm.clone(), fetcher, default_origin)),
            tabular: Arc::new(TabularStrategy::new(downloader.clone(), default_origin)),
            document: Arc::new(DocumentStrategy::new(downloader, parser, llm)),
            submitter: SubmissionAssembler::new(submission_client, default_origin),
        }
    }

    pub async fn run(&self, request: &SolveRequest, ctx: &QuizCtx) -> QuizResult<SolveReport> {
        // ========== 阶段 1: 抓取页面 ==========
        info!("{} 🌐 正在抓取题目页面...", ctx);
        let page = self
            .fetcher
            .fetch(&request.url)
            .await
            .map_err(QuizError::Fetch)?;
        info!("{} 题目: {}", ctx, truncate_text(&page.question_text, 200));

        // ========== 阶段 2: 分类 ==========
        let classification = self
            .classifier
            .classify(&page.question_text)
            .await
            .map_err(QuizError::Classification)?;

        // ========== 阶段 3: 路由 ==========
        let strategy = match request.strategy {
            Some(forced) => {
                info!("{} 使用指定策略: {}", ctx, forced);
                forced
            }
            None => route(&page, &classification),
        };
        info!("{} 🧭 选择策略: {} (分类: {:?})", ctx, strategy, classification.task_type);

        // ========== 阶段 4: 求解 ==========
        let answer = self.solve(strategy, &page, &classification).await?;
        info!("{} 💡 答案: {}", ctx, answer);

        // ========== 阶段 5: 提交 ==========
        let submit_url = page
            .submit_url
            .as_deref()
            .or_else(|| classification.submit_url());
        if submit_url.is_none() {
            warn!("{} ⚠️ 页面和分类结果中都没有提交地址", ctx);
        }

        let submission = Submission {
            email: request.email.clone(),
            secret: request.secret.clone(),
            url: request.url.clone(),
            answer,
        };
        let result = self
            .submitter
            .build_and_send(&request.url, submit_url, &submission)
            .await?;
        info!("{} ✓ 提交完成 (正确: {:?})", ctx, result.correct);

        Ok(SolveReport {
            task_type: classification.task_type,
            strategy,
            answer_submitted: submission.answer,
            submission_response: result.response,
            correct: result.correct,
            next_url: result.next_url,
        })
    }

    async fn solve(
        &self,
        strategy: StrategyKind,
        page: &QuizPage,
        classification: &Classification,
    ) -> QuizResult<Answer> {
        match strategy {
            StrategyKind::Simple => Ok(self.simple.solve(&page.question_text, classification).await),
            StrategyKind::WebScraping => {
                self.scraping
                    .solve(&page.question_text, classification)
                    .await
            }
            StrategyKind::Tabular => self.tabular.solve(page, classification).await,
            StrategyKind::Document => self.document.solve(page, classification).await,
        }
    }
}
