//! LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型（兼容 OpenAI API 的服务均可）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::clients::LanguageModel;
use crate::config::Config;
use crate::error::LlmError;
use crate::utils::logging::truncate_text;

/// LLM 客户端
///
/// 进程启动时构造一次，所有请求共用。
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数，返回原始文本
    pub async fn send_to_llm(&self, user_message: &str, system_message: &str) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed { source: Box::new(e) })?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed { source: Box::new(e) })?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(1024u32)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed { source: Box::new(e) })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete_json(&self, system: &str, prompt: &str) -> Result<JsonValue, LlmError> {
        let content = self.send_to_llm(prompt, system).await?;
        parse_json_response(&content)
    }
}

/// 解析模型返回的 JSON 对象
///
/// 兼容 ```json 代码块包裹以及前后带说明文字的情况。
pub fn parse_json_response(content: &str) -> Result<JsonValue, LlmError> {
    let body = strip_code_fence(content.trim());
    let candidate = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    };

    let value: JsonValue =
        serde_json::from_str(candidate).map_err(|e| LlmError::InvalidJson {
            response: truncate_text(content, 200),
            source: Box::new(e),
        })?;

    if !value.is_object() {
        return Err(LlmError::InvalidShape {
            source: format!("期望 JSON 对象，实际为: {}", value).into(),
        });
    }
    Ok(value)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// 读取 JSON 对象中的必需字段
pub fn required_field<'a>(value: &'a JsonValue, field: &str) -> Result<&'a JsonValue, LlmError> {
    match value.get(field) {
        Some(v) if !v.is_null() => Ok(v),
        _ => Err(LlmError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_json() {
        let value = parse_json_response(r#"{"answer": 42}"#).unwrap();
        assert_eq!(value, json!({"answer": 42}));
    }

    #[test]
    fn test_parse_fenced_json() {
        let value = parse_json_response("```json\n{\"answer\": \"abc\"}\n```").unwrap();
        assert_eq!(value["answer"], "abc");
    }

    #[test]
    fn test_parse_json_with_chatter() {
        let value = parse_json_response("Sure! {\"answer\": true} Hope this helps.").unwrap();
        assert_eq!(value["answer"], true);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_json_response("the answer is 42"),
            Err(LlmError::InvalidJson { .. })
        ));
        assert!(matches!(
            parse_json_response("[1, 2]"),
            Err(LlmError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_required_field() {
        let value = json!({"answer": null, "other": 1});
        assert!(matches!(
            required_field(&value, "answer"),
            Err(LlmError::MissingField { .. })
        ));
        assert_eq!(required_field(&value, "other").unwrap(), &json!(1));
    }

    /// 测试真实 LLM 调用
    #[tokio::test]
    #[ignore]
    async fn test_complete_json_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = LlmClient::new(&Config::from_env());
        let value = client
            .complete_json(
                "You are a precise assistant. Always respond with valid JSON.",
                r#"What is 2 + 3? Respond as {"answer": <number>}."#,
            )
            .await
            .expect("LLM 调用失败");
        println!("LLM 响应: {}", value);
        assert!(value.get("answer").is_some());
    }
}
