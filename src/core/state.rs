//! 流水线阶段（严格顺序执行，任一阶段失败即进入分类后的错误结果）

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    BuildAgents,
    Research,
    Synthesize,
    Persist,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Init => "INIT",
            PipelineStage::BuildAgents => "BUILD_AGENTS",
            PipelineStage::Research => "RESEARCH",
            PipelineStage::Synthesize => "SYNTHESIZE",
            PipelineStage::Persist => "PERSIST",
            PipelineStage::Done => "DONE",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
