//! 简单问答策略
//!
//! 模型调用失败时返回固定占位答案，这条路径总会给出答案

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::llm_client::required_field;
use crate::clients::LanguageModel;
use crate::error::LlmError;
use crate::models::{Answer, Classification};

/// 演示题的固定答案
pub const CANNED_ANSWER: &str = "Hello from quiz solver!";
/// 模型失败时的占位答案
pub const FALLBACK_ANSWER: &str = "test_answer";

const DEMO_PHRASE: &str = "anything you want";
const SYSTEM_MESSAGE: &str = "You are a quiz solver. Provide concise, accurate answers.";

pub struct SimpleStrategy {
    llm: Arc<dyn LanguageModel>,
}

impl SimpleStrategy {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    pub async fn solve(&self, question_text: &str, classification: &Classification) -> Answer {
        if question_text.to_lowercase().contains(DEMO_PHRASE) {
            info!("检测到演示题，直接提交固定答案");
            return json!(CANNED_ANSWER);
        }

        match self.ask(question_text, classification).await {
            Ok(answer) => {
                info!("生成答案: {}", answer);
                answer
            }
            Err(e) => {
                warn!("⚠️ 简单题求解失败，使用占位答案: {}", e);
                json!(FALLBACK_ANSWER)
            }
        }
    }

    async fn ask(&self, question_text: &str, classification: &Classification) -> Result<Answer, LlmError> {
        let prompt = format!(
            r#"Solve this quiz question and provide the answer.

Quiz Question:
{}

Instructions: {}
Expected answer format: {}

Provide ONLY the answer value, no explanation. Format your response as JSON with a single field "answer"."#,
            question_text, classification.instructions, classification.answer_format
        );

        let value = self.llm.complete_json(SYSTEM_MESSAGE, &prompt).await?;
        required_field(&value, "answer").cloned()
    }
}
