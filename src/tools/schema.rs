//! 工具参数与调用格式的 JSON Schema（schemars 自动生成）
//!
//! 两个工具共用同一输入：一个必填的 query 字符串。调用格式 schema 会拼入 system prompt，
//! 减少 LLM 输出格式错误。

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

/// 工具输入：唯一必填参数 query
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryArgs {
    /// 查询文本（搜索关键词，或用于输出标题的调研问题）
    pub query: String,
}

impl QueryArgs {
    /// QueryArgs 的 JSON Schema，作为每个工具的 input schema
    pub fn schema() -> Value {
        serde_json::to_value(schema_for!(QueryArgs)).unwrap_or(Value::Null)
    }
}

/// 工具调用请求格式：与 planner 解析的 `{"tool": "...", "args": {"query": "..."}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 web_research、kaggle_datasets_overview
    pub tool: String,
    /// 工具参数
    pub args: QueryArgs,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
