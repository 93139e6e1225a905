//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / input_schema / invoke），由 ToolRegistry 按注册顺序保存；
//! execute 先按 QueryArgs 校验参数再调用。注册表本身就是 Agent 的能力表，可为空。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::tools::QueryArgs;

/// 工具 trait：名称、描述（供 LLM 理解）、输入 schema、异步调用
///
/// invoke 总是返回文本；工具内部失败须渲染进返回值，不得向上抛出。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（用于 JSON 中的 "tool" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 输入 JSON Schema；默认是单个必填的 query 字符串
    fn input_schema(&self) -> Value {
        QueryArgs::schema()
    }

    /// 执行工具，返回自包含、长度有界、格式稳定的文本
    async fn invoke(&self, query: &str) -> String;
}

/// 能力表中的一行：名称、描述、输入 schema
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// 推理层发起的调用无法分派时的错误（作为 observation 反馈给模型，不中断流水线）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("Unknown tool: {name}. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    #[error("Invalid arguments for tool {tool}: {reason}. Expected {{\"query\": \"...\"}}")]
    InvalidArgs { tool: String, reason: String },
}

/// 工具注册表：保持注册顺序，名称重复时后注册者替换前者
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(i) => self.tools[i] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// 能力表：(name, description, input_schema)
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// 工具 schema JSON，拼入 system prompt 的 Available tools 段落
    pub fn schema_json(&self) -> String {
        let tools: Vec<Value> = self
            .specs()
            .into_iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "description": s.description,
                    "parameters": s.input_schema,
                })
            })
            .collect();
        serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string())
    }

    /// 校验参数并调用；未知工具或参数不合法时返回 ToolCallError
    pub async fn execute(&self, name: &str, args: Value) -> Result<String, ToolCallError> {
        let tool = self.get(name).ok_or_else(|| ToolCallError::UnknownTool {
            name: name.to_string(),
            available: self.tool_names().join(", "),
        })?;
        let parsed: QueryArgs =
            serde_json::from_value(args).map_err(|e| ToolCallError::InvalidArgs {
                tool: name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(tool.invoke(&parsed.query).await)
    }
}
