//! 页面抓取
//!
//! 在独立会话中打开题目页面，渲染后读取文本和 HTML

use async_trait::async_trait;
use chromiumoxide::Page;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, info};

use crate::browser::engine::{BrowserEngine, BrowserSession};
use crate::clients::PageFetcher;
use crate::config::Config;
use crate::error::BrowserError;
use crate::models::QuizPage;
use crate::services::extractor;
use crate::utils::logging::truncate_text;

/// 基于浏览器引擎的页面抓取器
pub struct BrowserFetcher {
    engine: Arc<BrowserEngine>,
    navigation_timeout: Duration,
    element_timeout: Duration,
    settle_delay: Duration,
}

impl BrowserFetcher {
    pub fn new(engine: Arc<BrowserEngine>, config: &Config) -> Self {
        Self {
            engine,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            element_timeout: Duration::from_millis(config.element_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    async fn load(&self, session: &BrowserSession, url: &str) -> Result<QuizPage, BrowserError> {
        let page = session.page();

        match timeout(self.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(BrowserError::navigation_failed(url, e)),
            Err(_) => {
                return Err(BrowserError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_ms: self.navigation_timeout.as_millis() as u64,
                })
            }
        }

        // 等待页面脚本执行
        sleep(self.settle_delay).await;

        let raw_markup = page
            .content()
            .await
            .map_err(|e| BrowserError::content_read_failed(url, e))?;

        let question_text = match timeout(self.element_timeout, element_text(page, "#result")).await
        {
            Ok(Ok(Some(text))) if !text.trim().is_empty() => {
                debug!("从 #result 元素读取内容");
                text
            }
            _ => {
                debug!("#result 不可用，读取 body 内容");
                element_text(page, "body")
                    .await
                    .map_err(|e| BrowserError::content_read_failed(url, e))?
                    .unwrap_or_default()
            }
        };

        info!("页面内容: {}", truncate_text(&question_text, 200));

        let submit_url = extractor::extract_submit_url(&question_text);
        Ok(QuizPage {
            url: url.to_string(),
            question_text,
            raw_markup,
            submit_url,
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<QuizPage, BrowserError> {
        info!("正在抓取页面: {}", url);
        let session = self.engine.open_session().await?;
        let result = self.load(&session, url).await;
        self.engine.close_session(session).await;
        result
    }
}

async fn element_text(
    page: &Page,
    selector: &str,
) -> Result<Option<String>, chromiumoxide::error::CdpError> {
    let element = page.find_element(selector).await?;
    element.inner_text().await
}
