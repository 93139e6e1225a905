//! 调研小组：两个 Agent（调研员带工具、撰写人无工具）与两个顺序任务
//!
//! ResearchCrew 在每次运行时构建一次；撰写任务的输入只能是调研任务的输出。

pub mod agent;
pub mod planner;
pub mod prompts;
pub mod runner;
pub mod task;

pub use agent::Agent;
pub use planner::{parse_llm_output, PlannerOutput, ToolCall};
pub use runner::{AgentRunner, TaskRunner};
pub use task::{Report, ResearchNotes, Task, TaskInput};

use std::sync::Arc;

use crate::llm::LlmClient;
use crate::tools::ToolRegistry;
use prompts::*;

#[derive(Debug, Clone)]
pub struct ResearchCrew {
    researcher: Agent,
    writer: Agent,
}

impl ResearchCrew {
    /// 调研员挂载 research_tools，撰写人不挂任何工具
    pub fn new(llm: Arc<dyn LlmClient>, research_tools: ToolRegistry) -> Self {
        let researcher = Agent::new(
            RESEARCHER_ROLE,
            RESEARCHER_GOAL,
            RESEARCHER_BACKSTORY,
            llm.clone(),
        )
        .with_tools(research_tools);
        let writer = Agent::new(WRITER_ROLE, WRITER_GOAL, WRITER_BACKSTORY, llm);
        Self { researcher, writer }
    }

    pub fn researcher(&self) -> &Agent {
        &self.researcher
    }

    pub fn writer(&self) -> &Agent {
        &self.writer
    }

    pub fn research_task(&self, query: &str) -> Task {
        Task::new(
            RESEARCH_TASK_DESCRIPTION,
            RESEARCH_TASK_EXPECTED,
            self.researcher.clone(),
            TaskInput::Query(query.to_string()),
        )
    }

    pub fn writing_task(&self, notes: &ResearchNotes) -> Task {
        Task::new(
            WRITING_TASK_DESCRIPTION,
            WRITING_TASK_EXPECTED,
            self.writer.clone(),
            TaskInput::PriorOutput(notes.0.clone()),
        )
    }
}
