//! 集成测试共用的协作者替身

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

use quiz_solve_submit::clients::{
    DocumentParser, Downloader, LanguageModel, PageFetcher, SubmissionClient,
};
use quiz_solve_submit::error::{BrowserError, DocumentError, HttpError, LlmError};
use quiz_solve_submit::models::QuizPage;
use quiz_solve_submit::services::extractor;

/// 按 URL 返回预设页面
#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
}

impl FakeWeb {
    pub fn page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn file(mut self, url: &str, bytes: &[u8]) -> Self {
        self.files.insert(url.to_string(), bytes.to_vec());
        self
    }
}

#[async_trait]
impl PageFetcher for FakeWeb {
    async fn fetch(&self, url: &str) -> Result<QuizPage, BrowserError> {
        let text = self.pages.get(url).ok_or_else(|| BrowserError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: 0,
        })?;
        Ok(QuizPage {
            url: url.to_string(),
            question_text: text.clone(),
            raw_markup: format!("<html><body><div id=\"result\">{}</div></body></html>", text),
            submit_url: extractor::extract_submit_url(text),
        })
    }
}

#[async_trait]
impl Downloader for FakeWeb {
    async fn download(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        self.files.get(url).cloned().ok_or_else(|| HttpError::BadStatus {
            endpoint: url.to_string(),
            status: 404,
        })
    }
}

/// 按顺序返回预设 JSON 的模型
pub struct QueuedLlm {
    responses: Mutex<VecDeque<JsonValue>>,
    pub prompts: Mutex<Vec<String>>,
}

impl QueuedLlm {
    pub fn new(responses: Vec<JsonValue>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for QueuedLlm {
    async fn complete_json(&self, _system: &str, prompt: &str) -> Result<JsonValue, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::missing_field("queued response"))
    }
}

/// 固定返回各页文本的解析器
pub struct FixedPages(pub Vec<String>);

#[async_trait]
impl DocumentParser for FixedPages {
    async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError> {
        assert!(path.exists(), "temp file must exist while parsing");
        Ok(self.0.clone())
    }
}

/// 记录所有提交
pub struct CapturingSubmitter {
    response: JsonValue,
    pub posts: Mutex<Vec<(String, JsonValue)>>,
}

impl CapturingSubmitter {
    pub fn new(response: JsonValue) -> Self {
        Self {
            response,
            posts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SubmissionClient for CapturingSubmitter {
    async fn post_json(&self, url: &str, body: &JsonValue) -> Result<JsonValue, HttpError> {
        self.posts.lock().unwrap().push((url.to_string(), body.clone()));
        Ok(self.response.clone())
    }
}
