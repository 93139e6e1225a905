//! 任务执行：TaskRunner trait 与默认的 AgentRunner（有界的 plan -> act -> observe 循环）
//!
//! 无工具的 Agent 只做一次 completion，回复原样作为输出；
//! 有工具的 Agent 每步要么调用工具（结果作为 observation 追加），要么给出最终回答。

use async_trait::async_trait;

use crate::core::PipelineError;
use crate::crew::planner::{parse_llm_output, PlannerOutput};
use crate::crew::prompts::{FINAL_ANSWER_PROMPT, RETRY_TOOL_CALL_PROMPT};
use crate::crew::Task;
use crate::llm::Message;
use crate::tools::ToolExecutor;

/// 执行单个任务并返回其文本输出
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<String, PipelineError>;
}

/// 默认执行器：驱动 Agent 的 LLM 与工具
#[derive(Debug, Clone)]
pub struct AgentRunner {
    max_steps: usize,
    tool_timeout_secs: u64,
}

impl AgentRunner {
    pub fn new(max_steps: usize, tool_timeout_secs: u64) -> Self {
        Self {
            max_steps,
            tool_timeout_secs,
        }
    }
}

impl Default for AgentRunner {
    fn default() -> Self {
        Self::new(8, 30)
    }
}

#[async_trait]
impl TaskRunner for AgentRunner {
    async fn execute(&self, task: &Task) -> Result<String, PipelineError> {
        let agent = &task.agent;
        let llm = agent.llm();
        let mut messages = vec![
            Message::system(agent.system_prompt()),
            Message::user(task.prompt()),
        ];

        if !agent.has_tools() {
            return llm.complete(&messages).await.map_err(PipelineError::Llm);
        }

        let executor = ToolExecutor::new(agent.tools().clone(), self.tool_timeout_secs);
        for step in 0..self.max_steps {
            let output = llm.complete(&messages).await.map_err(PipelineError::Llm)?;

            match parse_llm_output(&output) {
                Ok(PlannerOutput::FinalAnswer(answer)) => {
                    tracing::info!(role = %agent.role, step, "final answer");
                    return Ok(answer);
                }
                Ok(PlannerOutput::ToolCall(call)) => {
                    tracing::info!(role = %agent.role, step, tool = %call.tool, "tool call");
                    let invocation = executor.execute(&call.tool, call.args).await;
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(format!(
                        "Observation from {}:\n{}",
                        invocation.tool, invocation.result
                    )));
                }
                Err(reason) => {
                    tracing::warn!(role = %agent.role, step, reason = %reason, "unparsable tool call");
                    messages.push(Message::assistant(output));
                    messages.push(Message::user(RETRY_TOOL_CALL_PROMPT));
                }
            }
        }

        tracing::warn!(role = %agent.role, max_steps = self.max_steps, "step budget exhausted, forcing final answer");
        messages.push(Message::user(FINAL_ANSWER_PROMPT));
        llm.complete(&messages).await.map_err(PipelineError::Llm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{Agent, TaskInput};
    use crate::llm::{MockLlmClient, Role};
    use crate::tools::registry::tests::EchoTool;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn tool_agent(llm: Arc<MockLlmClient>) -> Agent {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool("web_research"));
        Agent::new("Researcher", "g", "b", llm).with_tools(tools)
    }

    #[tokio::test]
    async fn test_writer_single_completion_verbatim() {
        let llm = Arc::new(MockLlmClient::with_replies(["{\"tool\": \"x\"} kept as is"]));
        let agent = Agent::new("Writer", "g", "b", llm.clone());
        let task = Task::new("write", "report", agent, TaskInput::PriorOutput("notes".into()));

        let out = AgentRunner::default().execute(&task).await.unwrap();
        assert_eq!(out, "{\"tool\": \"x\"} kept as is");
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_call_then_answer() {
        let llm = Arc::new(MockLlmClient::with_replies([
            r#"{"tool": "web_research", "args": {"query": "zig"}}"#,
            "## Notes\nZig is fine.",
        ]));
        let task = Task::new("research", "notes", tool_agent(llm.clone()), TaskInput::Query("zig".into()));

        let out = AgentRunner::default().execute(&task).await.unwrap();
        assert_eq!(out, "## Notes\nZig is fine.");

        let second = &llm.requests()[1];
        let observation = second.last().unwrap();
        assert_eq!(observation.role, Role::User);
        assert_eq!(observation.content, "Observation from web_research:\nweb_research: zig");
    }

    #[tokio::test]
    async fn test_bad_json_gets_retry_prompt() {
        let llm = Arc::new(MockLlmClient::with_replies([
            r#"{"tool": "web_research", "args": "#,
            "done",
        ]));
        let task = Task::new("research", "notes", tool_agent(llm.clone()), TaskInput::Query("q".into()));

        assert_eq!(AgentRunner::default().execute(&task).await.unwrap(), "done");
        assert_eq!(llm.requests()[1].last().unwrap().content, RETRY_TOOL_CALL_PROMPT);
    }

    #[tokio::test]
    async fn test_step_budget_forces_final_answer() {
        let llm = Arc::new(MockLlmClient::new());
        for _ in 0..2 {
            llm.push_reply(r#"{"tool": "web_research", "args": {"query": "again"}}"#);
        }
        llm.push_reply("forced answer");
        let task = Task::new("research", "notes", tool_agent(llm.clone()), TaskInput::Query("q".into()));

        let out = AgentRunner::new(2, 5).execute(&task).await.unwrap();
        assert_eq!(out, "forced answer");
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.requests()[2].last().unwrap().content, FINAL_ANSWER_PROMPT);
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = Arc::new(MockLlmClient::failing("429 Too Many Requests"));
        let task = Task::new("research", "notes", tool_agent(llm), TaskInput::Query("q".into()));
        let err = AgentRunner::default().execute(&task).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(ref m) if m.contains("429")));
    }
}
