/// HTTP 客户端
///
/// 负责文件下载和答案提交，两者共用一个 `reqwest::Client`
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::{Downloader, SubmissionClient};
use crate::config::Config;
use crate::error::HttpError;

/// HTTP 客户端
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// 创建新的 HTTP 客户端
    pub fn new(config: &Config) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| HttpError::request_failed("client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpClient {
    async fn download(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        debug!("下载文件: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("下载失败: {} (HTTP {})", url, status.as_u16());
            return Err(HttpError::BadStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::request_failed(url, e))?;

        debug!("下载完成: {} 字节", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SubmissionClient for HttpClient {
    /// 发送一次 POST，不重试
    ///
    /// 只要响应体是 JSON 就原样返回（提交端点答错时也可能返回 4xx + JSON）。
    async fn post_json(&self, url: &str, body: &JsonValue) -> Result<JsonValue, HttpError> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| HttpError::request_failed(url, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::request_failed(url, e))?;

        match serde_json::from_str::<JsonValue>(&text) {
            Ok(value) => {
                if !status.is_success() {
                    warn!("提交端点返回 HTTP {}: {}", status.as_u16(), value);
                }
                Ok(value)
            }
            Err(e) if status.is_success() => Err(HttpError::JsonParseFailed {
                endpoint: url.to_string(),
                source: Box::new(e),
            }),
            Err(_) => Err(HttpError::BadStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}
