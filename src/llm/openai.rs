//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；Groq、OpenAI、自建代理均走这里。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::llm::{LlmClient, Message, Role};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容客户端：持有 Client、model、temperature 与请求超时
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    request_timeout: Duration,
    /// 鉴权失败时写进错误信息的凭证变量名，便于上层分类
    credential_var: Option<&'static str>,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = match base_url {
            Some(url) => OpenAIConfig::new().with_api_base(url).with_api_key(api_key),
            None => OpenAIConfig::new().with_api_key(api_key),
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            temperature: 0.2,
            request_timeout: Duration::from_secs(60),
            credential_var: None,
            usage: TokenUsage::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_credential_var(mut self, var: &'static str) -> Self {
        self.credential_var = Some(var);
        self
    }

    fn to_openai_messages(
        &self,
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, String> {
        messages
            .iter()
            .map(|m| {
                let msg = match m.role {
                    Role::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(|e| e.to_string())?,
                    ),
                    Role::User => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(|e| e.to_string())?,
                    ),
                    Role::Assistant => ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(|e| e.to_string())?,
                    ),
                };
                Ok(msg)
            })
            .collect()
    }

    /// 服务端明确返回鉴权失败（ApiError 的 code / message）时，改写为带凭证变量名的信息；其余原样返回
    fn describe_error(&self, err: &OpenAIError) -> String {
        let raw = err.to_string();
        match (self.credential_var, err) {
            (Some(var), OpenAIError::ApiError(api)) if is_auth_failure(api) => {
                format!("{var} was rejected by the provider: {raw}")
            }
            _ => raw,
        }
    }
}

/// 只看结构化字段；限流 / 配额类错误即使文本里带 401 之类的数字也不算鉴权失败
fn is_auth_failure(api: &ApiError) -> bool {
    let message = api.message.to_lowercase();
    if message.contains("429") || message.contains("quota") || message.contains("rate limit") {
        return false;
    }
    api.code.as_deref() == Some("invalid_api_key")
        || message.contains("invalid api key")
        || message.contains("incorrect api key")
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(self.to_openai_messages(messages)?)
            .build()
            .map_err(|e| e.to_string())?;

        let response = tokio::time::timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                format!(
                    "LLM request timed out after {}s",
                    self.request_timeout.as_secs()
                )
            })?
            .map_err(|e| self.describe_error(&e))?;

        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        tracing::debug!(model = %self.model, chars = content.len(), "llm completion");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(message: &str, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: code.map(String::from),
        })
    }

    fn groq_client() -> OpenAiClient {
        OpenAiClient::new(None, "m", "k").with_credential_var("GROQ_API_KEY")
    }

    #[test]
    fn test_auth_failure_names_credential() {
        let msg = groq_client().describe_error(&api_error("Invalid API Key", Some("invalid_api_key")));
        assert!(msg.starts_with("GROQ_API_KEY was rejected"));
    }

    #[test]
    fn test_rate_limit_with_token_counts_untouched() {
        let err = api_error(
            "status 429: Rate limit reached for model `llama-3.3-70b-versatile` on tokens per minute (TPM): \
             Limit 12000, Used 11401, Requested 1533. Please try again in 4.67s.",
            Some("rate_limit_exceeded"),
        );
        let msg = groq_client().describe_error(&err);
        assert!(!msg.contains("GROQ_API_KEY"));
        assert_eq!(crate::core::classify(&msg), crate::core::ErrorKind::QuotaError);
    }

    #[test]
    fn test_non_api_errors_untouched() {
        let err = OpenAIError::InvalidArgument("401 in a model name".to_string());
        assert_eq!(groq_client().describe_error(&err), "invalid args: 401 in a model name");
    }

    #[test]
    fn test_no_credential_var_no_rewrite() {
        let client = OpenAiClient::new(None, "m", "k");
        let msg = client.describe_error(&api_error("Invalid API Key", Some("invalid_api_key")));
        assert!(!msg.contains("was rejected"));
    }

    #[test]
    fn test_token_usage_accumulates() {
        let usage = TokenUsage::new();
        usage.add(10, 5);
        usage.add(1, 2);
        assert_eq!(usage.get(), (11, 7, 18));
    }
}
