//! 外部协作者
//!
//! 流水线只依赖这里的 trait，具体实现（浏览器、LLM、HTTP、PDF）在启动时构造一次后注入。

pub mod http_client;
pub mod llm_client;
pub mod pdf_parser;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::error::{BrowserError, DocumentError, HttpError, LlmError};
use crate::models::QuizPage;

pub use http_client::HttpClient;
pub use llm_client::LlmClient;
pub use pdf_parser::PdfTextParser;

/// 页面抓取
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<QuizPage, BrowserError>;
}

/// 文件下载
#[async_trait]
pub trait Downloader: Send + Sync {
    /// 非成功状态码返回 [`HttpError::BadStatus`]
    async fn download(&self, url: &str) -> Result<Vec<u8>, HttpError>;
}

/// 语言模型
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// 发送提示词，要求模型返回一个 JSON 对象
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<JsonValue, LlmError>;
}

/// 文档解析
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// 按页返回文本
    async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, DocumentError>;
}

/// 提交答案
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn post_json(&self, url: &str, body: &JsonValue) -> Result<JsonValue, HttpError>;
}

/// 单元测试用的协作者替身
#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 按顺序返回预设响应的 LLM
    #[derive(Default)]
    pub struct ScriptedLlm {
        responses: Mutex<VecDeque<Result<JsonValue, LlmError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedLlm {
        pub fn new(responses: Vec<Result<JsonValue, LlmError>>) -> Self {
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
    impl LanguageModel for ScriptedLlm {
        async fn complete_json(&self, _system: &str, prompt: &str) -> Result<JsonValue, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::missing_field("scripted response")))
        }
    }

    /// 被调用就失败的 LLM
    pub struct ForbiddenLlm;

    #[async_trait]
    impl LanguageModel for ForbiddenLlm {
        async fn complete_json(&self, _system: &str, _prompt: &str) -> Result<JsonValue, LlmError> {
            panic!("language model must not be called");
        }
    }

    /// 按 URL 返回页面的抓取器
    #[derive(Default)]
    pub struct StaticFetcher {
        pub pages: HashMap<String, String>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn with_page(url: &str, text: &str) -> Self {
            let mut pages = HashMap::new();
            pages.insert(url.to_string(), text.to_string());
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<QuizPage, BrowserError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(text) => Ok(QuizPage {
                    url: url.to_string(),
                    question_text: text.clone(),
                    raw_markup: format!("<html><body>{}</body></html>", text),
                    submit_url: crate::services::extractor::extract_submit_url(text),
                }),
                None => Err(BrowserError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_ms: 0,
                }),
            }
        }
    }

    /// 按 URL 返回字节的下载器
    #[derive(Default)]
    pub struct StaticDownloader {
        pub files: HashMap<String, Vec<u8>>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StaticDownloader {
        pub fn with_file(url: &str, bytes: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(url.to_string(), bytes.to_vec());
            Self {
                files,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Downloader for StaticDownloader {
        async fn download(&self, url: &str) -> Result<Vec<u8>, HttpError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| HttpError::BadStatus {
                    endpoint: url.to_string(),
                    status: 404,
                })
        }
    }

    /// 记录调用次数的提交客户端
    pub struct RecordingSubmitter {
        pub response: JsonValue,
        pub calls: AtomicUsize,
        pub last: Mutex<Option<(String, JsonValue)>>,
    }

    impl RecordingSubmitter {
        pub fn new(response: JsonValue) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SubmissionClient for RecordingSubmitter {
        async fn post_json(&self, url: &str, body: &JsonValue) -> Result<JsonValue, HttpError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((url.to_string(), body.clone()));
            Ok(self.response.clone())
        }
    }
}
