//! 网页抓取策略
//!
//! 先让模型给出要抓取的地址，抓取后再让模型从新页面中提取答案。

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::llm_client::required_field;
use crate::clients::{LanguageModel, PageFetcher};
use crate::error::{LlmError, QuizError, QuizResult};
use crate::models::{Answer, Classification, ScrapeDirective};
use crate::services::extractor;
use crate::utils::logging::truncate_text;

const DIRECTIVE_SYSTEM_MESSAGE: &str =
    "You are a web scraping expert. Always respond with valid JSON.";
const EXTRACT_SYSTEM_MESSAGE: &str = "You are a data extraction expert.";

pub struct ScrapingStrategy {
    llm: Arc<dyn LanguageModel>,
    fetcher: Arc<dyn PageFetcher>,
    default_origin: String,
}

impl ScrapingStrategy {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        fetcher: Arc<dyn PageFetcher>,
        default_origin: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            fetcher,
            default_origin: default_origin.into(),
        }
    }

    pub async fn solve(&self, question_text: &str, _classification: &Classification) -> QuizResult<Answer> {
        let directive = self
            .request_directive(question_text)
            .await
            .map_err(QuizError::Scrape)?;
        info!("需要抓取: {} (目标: {})", directive.target_url, directive.extraction_goal);

        let target_url = self.resolve_target(question_text, &directive.target_url);
        info!("完整抓取地址: {}", target_url);

        let scraped = self.fetcher.fetch(&target_url).await.map_err(QuizError::Fetch)?;
        info!("抓取内容: {}", truncate_text(&scraped.question_text, 200));

        let answer = self
            .extract_answer(question_text, &directive, &scraped.question_text)
            .await
            .map_err(QuizError::Scrape)?;
        info!("从抓取页面提取答案: {}", answer);
        Ok(answer)
    }

    /// 以 `/` 开头的地址基于题目文本中出现的 origin 补全，找不到用默认 origin
    pub fn resolve_target(&self, question_text: &str, target_url: &str) -> String {
        if !target_url.starts_with('/') {
            return target_url.to_string();
        }
        let origin = extractor::extract_origin(question_text).unwrap_or_else(|| {
            warn!("题目文本中没有 origin，使用默认 origin");
            self.default_origin.clone()
        });
        extractor::join_origin(&origin, target_url)
    }

    async fn request_directive(&self, question_text: &str) -> Result<ScrapeDirective, LlmError> {
        let prompt = format!(
            r#"Look at this quiz question and tell me what URL needs to be scraped.

Quiz:
{}

Respond with JSON containing:
1. "scrape_url": The URL/path that needs to be scraped (if relative, include it as-is)
2. "what_to_find": What information to extract from that page

Respond ONLY with valid JSON."#,
            question_text
        );

        let value = self.llm.complete_json(DIRECTIVE_SYSTEM_MESSAGE, &prompt).await?;
        serde_json::from_value(value).map_err(|e| LlmError::InvalidShape {
            source: Box::new(e),
        })
    }

    async fn extract_answer(
        &self,
        question_text: &str,
        directive: &ScrapeDirective,
        scraped_text: &str,
    ) -> Result<Answer, LlmError> {
        let prompt = format!(
            r#"Extract the answer from this scraped content.

Original Question: {}
What to find: {}

Scraped Content:
{}

Extract ONLY the answer value. Respond with JSON containing a single field "answer"."#,
            question_text, directive.extraction_goal, scraped_text
        );

        let value = self.llm.complete_json(EXTRACT_SYSTEM_MESSAGE, &prompt).await?;
        required_field(&value, "answer").cloned()
    }
}
