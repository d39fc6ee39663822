//! 答案提交服务 - 业务能力层
//!
//! 只负责"提交"能力：确定提交地址、组装请求体、发送一次 POST

use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::clients::SubmissionClient;
use crate::error::{QuizError, QuizResult};
use crate::models::{Submission, SubmissionResult};
use crate::services::extractor;

/// 答案提交服务
#[derive(Clone)]
pub struct SubmissionAssembler {
    client: Arc<dyn SubmissionClient>,
    default_origin: String,
}

impl SubmissionAssembler {
    pub fn new(client: Arc<dyn SubmissionClient>, default_origin: impl Into<String>) -> Self {
        Self {
            client,
            default_origin: default_origin.into(),
        }
    }

    /// 提交答案
    ///
    /// 页面中提取的地址优先，其次是分类结果给出的地址；都没有时在发送任何请求之前失败。
    pub async fn build_and_send(
        &self,
        quiz_url: &str,
        submit_url: Option<&str>,
        submission: &Submission,
    ) -> QuizResult<SubmissionResult> {
        let submit_url = submit_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(QuizError::MissingSubmitUrl)?;

        let target = self.resolve_submit_url(quiz_url, submit_url);
        info!("📤 提交答案到: {}", target);

        let body = serde_json::to_value(submission).map_err(|e| {
            QuizError::Submission(crate::error::HttpError::JsonParseFailed {
                endpoint: target.clone(),
                source: Box::new(e),
            })
        })?;

        let response = self
            .client
            .post_json(&target, &body)
            .await
            .map_err(QuizError::Submission)?;

        let result = SubmissionResult::from_response(response);
        match result.correct {
            Some(true) => info!("✓ 答案正确"),
            Some(false) => warn!("⚠️ 答案错误: {}", result.response),
            None => info!("提交完成，响应未包含 correct 字段"),
        }
        Ok(result)
    }

    /// 相对地址只基于题目地址的 origin（scheme + host）补全，不考虑题目地址的路径
    pub fn resolve_submit_url(&self, quiz_url: &str, submit_url: &str) -> String {
        if Url::parse(submit_url).is_ok() {
            return submit_url.to_string();
        }

        let origin = extractor::origin_of(quiz_url).unwrap_or_else(|| {
            warn!("无法从题目地址 {} 确定 origin，使用默认 origin", quiz_url);
            self.default_origin.clone()
        });
        extractor::join_origin(&origin, submit_url)
    }
}
