use crate::error::{PipelineStage, QuizError};
use crate::models::quiz::{Answer, StrategyKind, TaskType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 调用方发起的求解请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub email: String,
    pub secret: String,
    pub url: String,
    /// 显式指定策略，不指定时由路由决定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
}

/// 发往提交地址的请求体
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub email: String,
    pub secret: String,
    /// 题目地址
    pub url: String,
    pub answer: Answer,
}

/// 提交结果
///
/// `correct` 与 `next_url` 原样取自响应，缺失不算错误。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResult {
    pub response: JsonValue,
    pub correct: Option<bool>,
    pub next_url: Option<String>,
}

impl SubmissionResult {
    pub fn from_response(response: JsonValue) -> Self {
        let correct = response.get("correct").and_then(|v| v.as_bool());
        let next_url = response
            .get("url")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Self {
            response,
            correct,
            next_url,
        }
    }
}

/// 成功求解的报告
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub task_type: TaskType,
    pub strategy: StrategyKind,
    pub answer_submitted: Answer,
    pub submission_response: JsonValue,
    pub correct: Option<bool>,
    pub next_url: Option<String>,
}

/// 失败报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolveFailure {
    pub stage: PipelineStage,
    pub reason: String,
}

impl SolveFailure {
    pub fn new(stage: PipelineStage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

impl From<QuizError> for SolveFailure {
    fn from(err: QuizError) -> Self {
        Self::new(err.stage(), err.to_string())
    }
}
