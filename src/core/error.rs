//! 流水线错误类型
//!
//! 只在编排器边界被捕获一次：转为字符串后交给 classifier，不会越过 run 接口。

use thiserror::Error;

use crate::core::PipelineStage;
use crate::knowledge::KnowledgeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// 必需的凭证未配置（变量名出现在消息中，分类为 credential_error）
    #[error("{0} is required but not configured")]
    MissingCredential(&'static str),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Stage {stage} exceeded its deadline of {secs}s")]
    StageTimeout { stage: PipelineStage, secs: u64 },

    /// 阶段任务 panic 或被取消
    #[error("Stage {stage} aborted: {reason}")]
    StageAborted { stage: PipelineStage, reason: String },

    #[error("Stage {0} produced empty output")]
    EmptyOutput(PipelineStage),

    #[error("Failed to persist report: {0}")]
    Persist(#[from] KnowledgeError),
}
