//! Groq API 客户端（OpenAI 兼容格式）
//!
//! - Base URL: https://api.groq.com/openai/v1
//! - 凭证：GROQ_API_KEY（由 AppConfig 解析后显式传入，不读写进程环境）

use std::sync::Arc;

use crate::config::{AppConfig, LLM_CREDENTIAL_VAR};
use crate::core::PipelineError;
use crate::llm::{LlmClient, OpenAiClient};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// 按配置创建 Groq 客户端；凭证缺失时返回 MissingCredential（分类为 credential_error）
pub fn create_groq_client(cfg: &AppConfig) -> Result<Arc<dyn LlmClient>, PipelineError> {
    let api_key = cfg
        .llm
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(PipelineError::MissingCredential(LLM_CREDENTIAL_VAR))?;

    let provider = cfg.llm.provider.to_lowercase();
    if provider != "groq" {
        tracing::warn!(provider = %provider, "unknown llm provider, using Groq-compatible endpoint");
    }

    let base_url = cfg.llm.base_url.as_deref().unwrap_or(GROQ_BASE_URL);
    let model = cfg.model_name();
    tracing::info!(model = %model, base_url = %base_url, "Using Groq LLM");

    Ok(Arc::new(
        OpenAiClient::new(Some(base_url), model, api_key)
            .with_temperature(cfg.llm.temperature)
            .with_request_timeout(cfg.llm.timeouts.request)
            .with_credential_var(LLM_CREDENTIAL_VAR),
    ))
}
