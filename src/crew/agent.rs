//! Agent：角色 + 推理能力 + 工具能力表（可为空）
//!
//! 每次运行构造一次，用完即弃；除角色描述外不持有状态。

use std::fmt;
use std::sync::Arc;

use crate::crew::prompts::{DIRECT_ANSWER_PROTOCOL, TOOL_PROTOCOL};
use crate::llm::LlmClient;
use crate::tools::{tool_call_schema_json, ToolRegistry};

#[derive(Clone)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            llm,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// system prompt：角色、目标、背景，有工具时附加工具表与调用格式
    pub fn system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are the {}.\nGoal: {}\nBackground: {}\n\n",
            self.role, self.goal, self.backstory
        );
        if self.has_tools() {
            prompt.push_str("## Available tools\n");
            prompt.push_str(&self.tools.schema_json());
            prompt.push_str("\n\n## Tool call format (JSON Schema)\n");
            prompt.push_str(&tool_call_schema_json());
            prompt.push_str("\n\n");
            prompt.push_str(TOOL_PROTOCOL);
        } else {
            prompt.push_str(DIRECT_ANSWER_PROTOCOL);
        }
        prompt
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.role)
            .field("tools", &self.tools.tool_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::tools::registry::tests::EchoTool;

    #[test]
    fn test_prompt_without_tools() {
        let agent = Agent::new("Writer", "write", "wrote before", Arc::new(MockLlmClient::new()));
        let prompt = agent.system_prompt();
        assert!(prompt.starts_with("You are the Writer."));
        assert!(prompt.contains("You have no tools"));
        assert!(!prompt.contains("Available tools"));
    }

    #[test]
    fn test_prompt_lists_tools() {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool("web_research"));
        let agent = Agent::new("Researcher", "g", "b", Arc::new(MockLlmClient::new())).with_tools(tools);
        assert!(agent.has_tools());
        let prompt = agent.system_prompt();
        assert!(prompt.contains("\"name\": \"web_research\""));
        assert!(prompt.contains("{\"tool\": \"<tool name>\""));
    }
}
