//! 题目分类服务 - 业务能力层
//!
//! 只负责"这道题是什么类型"的判断，不关心后续流程

use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::LanguageModel;
use crate::error::LlmError;
use crate::models::Classification;

const SYSTEM_MESSAGE: &str =
    "You are a precise quiz analyzer. Always respond with valid JSON.";

/// 题目分类服务
///
/// 不做重试，是否重试由调用方决定
#[derive(Clone)]
pub struct TaskClassifier {
    llm: Arc<dyn LanguageModel>,
}

impl TaskClassifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// 对题目文本进行分类
    pub async fn classify(&self, question_text: &str) -> Result<Classification, LlmError> {
        debug!("请求 LLM 分类题目，文本长度: {} 字符", question_text.len());

        let prompt = build_classify_prompt(question_text);
        let value = self.llm.complete_json(SYSTEM_MESSAGE, &prompt).await?;

        let classification: Classification =
            serde_json::from_value(value).map_err(|e| LlmError::InvalidShape {
                source: Box::new(e),
            })?;

        info!(
            "✓ 题目分类完成: {:?} (答案格式: {})",
            classification.task_type, classification.answer_format
        );
        Ok(classification)
    }
}

fn build_classify_prompt(question_text: &str) -> String {
    format!(
        r#"You are a quiz analysis expert. Analyze this quiz question and provide a structured response.

Quiz Question:
{}

Provide your analysis in JSON format with these fields:
1. "task_type": What type of task is this? (data_analysis, pdf_extraction, web_scraping, visualization, calculation, text_question)
2. "files_to_download": List of file URLs mentioned in the question (empty list if none)
3. "submit_url": The URL where the answer should be submitted
4. "quiz_url": The original quiz URL (extract from the question)
5. "instructions": Brief summary of what needs to be done
6. "answer_format": What format should the answer be? (number, string, boolean, object, base64_file)

Respond ONLY with valid JSON, no markdown formatting."#,
        question_text
    )
}
