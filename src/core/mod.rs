//! 流水线核心：阶段状态、错误类型与分类、运行结果、编排器
//!
//! - **state**：INIT → BUILD_AGENTS → RESEARCH → SYNTHESIZE → PERSIST → DONE
//! - **error**：阶段内可能出现的 PipelineError
//! - **classifier**：把失败文本归为 credential / quota / general，并给出修复指引
//! - **orchestrator**：ResearchPipeline::run，唯一把内部错误转换为 RunOutcome 的地方

pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod state;

pub use classifier::{classify, guidance, ErrorKind};
pub use error::PipelineError;
pub use orchestrator::ResearchPipeline;
pub use outcome::RunOutcome;
pub use state::PipelineStage;
