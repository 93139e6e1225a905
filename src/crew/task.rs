//! Task：分配给单个 Agent 的一项工作（说明、期望输出、输入来源）
//!
//! 阶段间的交接是显式类型：调研阶段产出 ResearchNotes，撰写阶段的输入只能是它。

use crate::crew::Agent;

/// 任务输入来源：原始查询，或上一任务的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Query(String),
    PriorOutput(String),
}

impl TaskInput {
    pub fn text(&self) -> &str {
        match self {
            TaskInput::Query(s) | TaskInput::PriorOutput(s) => s,
        }
    }
}

/// 调研阶段输出（markdown 调研笔记）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchNotes(pub String);

/// 撰写阶段输出（最终报告）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(pub String);

#[derive(Debug, Clone)]
pub struct Task {
    pub description: String,
    pub expected_output: String,
    pub agent: Agent,
    pub input: TaskInput,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Agent,
        input: TaskInput,
    ) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            input,
        }
    }

    /// 发给 Agent 的用户消息：说明 + 期望输出 + 输入
    pub fn prompt(&self) -> String {
        let input_block = match &self.input {
            TaskInput::Query(q) => format!("## Research query\n{q}"),
            TaskInput::PriorOutput(text) => format!("## Input from the previous task\n{text}"),
        };
        format!(
            "{}\n\n## Expected output\n{}\n\n{}",
            self.description, self.expected_output, input_block
        )
    }
}
