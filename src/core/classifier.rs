//! 错误分类：按固定优先级做子串匹配，给出对应的修复指引
//!
//! 1. credential_error：提到 GROQ_API_KEY 或凭证相关的初始化失败
//! 2. quota_error：包含 429、quota（不区分大小写）或 RESOURCE_EXHAUSTED
//! 3. general_error：其余情况
//!
//! 纯函数，不重试、不修改任何状态。

use std::fmt;

use serde::Serialize;

use crate::config::LLM_CREDENTIAL_VAR;

/// 指引中附带的原始错误最大字符数
const TECHNICAL_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CredentialError,
    QuotaError,
    GeneralError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CredentialError => "credential_error",
            ErrorKind::QuotaError => "quota_error",
            ErrorKind::GeneralError => "general_error",
        }
    }

    /// 该类别的固定修复模板
    pub fn remediation(&self) -> &'static str {
        match self {
            ErrorKind::CredentialError => CREDENTIAL_REMEDIATION,
            ErrorKind::QuotaError => QUOTA_REMEDIATION,
            ErrorKind::GeneralError => GENERAL_REMEDIATION,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CREDENTIAL_REMEDIATION: &str = "## Groq API Key Error\n\n\
Your Groq API key is missing or invalid.\n\n\
### Fix Steps\n\n\
1. **Get a free Groq key**: https://console.groq.com/keys\n\
2. **Create an API key** (it starts with `gsk_...`)\n\
3. **Set it** in `.env` or the environment:\n\
   ```env\n\
   GROQ_API_KEY=gsk_your_actual_key_here\n\
   ```\n\
4. **Run again**\n";

const QUOTA_REMEDIATION: &str = "## API Quota Error\n\n\
You've exceeded your Groq API quota or rate limit.\n\n\
### Solutions\n\n\
1. **Wait a few minutes** and try again (rate limits reset)\n\
2. **Check your usage**: https://console.groq.com/\n\
3. **Upgrade to a paid tier** if needed, or switch to a smaller model via `GROQ_MODEL`\n";

const GENERAL_REMEDIATION: &str = "## Research Run Failed\n\n\
An unexpected error stopped the pipeline.\n\n\
### Next Steps\n\n\
1. **Check network access** to the LLM and search endpoints\n\
2. **Re-run with `RUST_LOG=debug`** to see each stage and tool call\n\
3. **Verify the configuration** with `scout status`\n";

/// 将原始错误文本归类；相同输入总是得到相同类别
pub fn classify(raw_error: &str) -> ErrorKind {
    if raw_error.contains(LLM_CREDENTIAL_VAR) || raw_error.contains("Error importing") {
        ErrorKind::CredentialError
    } else if raw_error.contains("429")
        || raw_error.to_lowercase().contains("quota")
        || raw_error.contains("RESOURCE_EXHAUSTED")
    {
        ErrorKind::QuotaError
    } else {
        ErrorKind::GeneralError
    }
}

/// 面向用户的失败说明：类别模板 + 原始错误前 500 个字符
pub fn guidance(kind: ErrorKind, raw_error: &str) -> String {
    let excerpt: String = raw_error.chars().take(TECHNICAL_EXCERPT_CHARS).collect();
    format!("{}\n**Technical Error**: {}", kind.remediation(), excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_first() {
        assert_eq!(
            classify("GROQ_API_KEY was rejected by the provider: 429"),
            ErrorKind::CredentialError
        );
        assert_eq!(
            classify("Error importing provider module"),
            ErrorKind::CredentialError
        );
    }

    #[test]
    fn test_quota_markers() {
        assert_eq!(
            classify("upstream said 429 while fetching https://x"),
            ErrorKind::QuotaError
        );
        assert_eq!(classify("Daily Quota exceeded"), ErrorKind::QuotaError);
        assert_eq!(
            classify("status: RESOURCE_EXHAUSTED"),
            ErrorKind::QuotaError
        );
    }

    #[test]
    fn test_general_fallback() {
        assert_eq!(classify("connection reset by peer"), ErrorKind::GeneralError);
        assert_eq!(classify(""), ErrorKind::GeneralError);
    }

    #[test]
    fn test_idempotent() {
        for msg in ["429", "GROQ_API_KEY", "boom", "resource_exhausted"] {
            assert_eq!(classify(msg), classify(msg));
        }
    }

    #[test]
    fn test_guidance_truncates_technical_error() {
        let raw = "x".repeat(800);
        let text = guidance(ErrorKind::GeneralError, &raw);
        assert!(text.starts_with(GENERAL_REMEDIATION));
        let excerpt = text.split("**Technical Error**: ").nth(1).unwrap();
        assert_eq!(excerpt.chars().count(), 500);
    }

    #[test]
    fn test_guidance_names_fix() {
        let text = guidance(ErrorKind::CredentialError, "GROQ_API_KEY is required but not configured");
        assert!(text.contains("https://console.groq.com/keys"));
        assert!(text.ends_with("GROQ_API_KEY is required but not configured"));
    }

    #[test]
    fn test_serialized_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::QuotaError).unwrap(),
            "\"quota_error\""
        );
    }
}
