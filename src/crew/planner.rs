//! 解析 LLM 输出：JSON 工具调用或最终回答
//!
//! 只有当候选 JSON（```json 代码块，或以 `{` 开头的整段回复）里出现 "tool" 键时才按工具调用解析，
//! 这样最终报告里夹带的代码片段不会被误判。

use serde::{Deserialize, Serialize};

/// LLM 返回的工具调用（{"tool": "web_research", "args": {"query": "..."}}）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutput {
    /// 最终回答
    FinalAnswer(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 解析失败时返回 Err（错误描述 + 原始 JSON），由调用方注入纠正提示
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, String> {
    let trimmed = output.trim();

    let candidate = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()))
    } else if trimmed.starts_with('{') {
        Some(trimmed)
    } else {
        None
    };

    let Some(json_str) = candidate.filter(|c| c.contains("\"tool\"")) else {
        return Ok(PlannerOutput::FinalAnswer(trimmed.to_string()));
    };

    let parsed: ToolCall =
        serde_json::from_str(json_str).map_err(|e| format!("{}: {}", e, json_str))?;

    if parsed.tool.trim().is_empty() {
        Ok(PlannerOutput::FinalAnswer(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCall(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_answer() {
        let out = parse_llm_output("  # Report\n\nAll good.  ").unwrap();
        assert_eq!(out, PlannerOutput::FinalAnswer("# Report\n\nAll good.".to_string()));
    }

    #[test]
    fn test_bare_tool_call() {
        let out = parse_llm_output(r#"{"tool": "web_research", "args": {"query": "bun vs deno"}}"#).unwrap();
        match out {
            PlannerOutput::ToolCall(tc) => {
                assert_eq!(tc.tool, "web_research");
                assert_eq!(tc.args["query"], "bun vs deno");
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn test_fenced_tool_call() {
        let text = "Let me search.\n```json\n{\"tool\": \"kaggle_datasets_overview\", \"args\": {\"query\": \"ev\"}}\n```";
        assert!(matches!(parse_llm_output(text).unwrap(), PlannerOutput::ToolCall(_)));
    }

    #[test]
    fn test_report_with_code_is_answer() {
        let text = "## Example\n\n```rust\nfn main() { println!(\"{}\", 1); }\n```";
        assert!(matches!(parse_llm_output(text).unwrap(), PlannerOutput::FinalAnswer(_)));
    }

    #[test]
    fn test_broken_tool_json_is_error() {
        let err = parse_llm_output(r#"{"tool": "web_research", "args": {"query": }"#).unwrap_err();
        assert!(err.contains("\"tool\""));
    }
}
